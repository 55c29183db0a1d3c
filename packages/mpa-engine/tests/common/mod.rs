//! Common test utilities for mpa-engine
//!
//! Shared programs, automata and controller builders for the integration
//! tests.

#![allow(dead_code)]

mod builders;
mod fixtures;

pub use builders::*;
pub use fixtures::*;

use std::sync::Once;

static TRACING: Once = Once::new();

/// Install a fmt subscriber once per test binary; `RUST_LOG` selects the level
pub fn init_tracing() {
    TRACING.call_once(|| {
        let filter = tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}
