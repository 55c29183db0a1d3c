//! Shared module - Common types
//!
//! Types shared across all features: properties, the control-flow
//! automaton the analyses run over, and the cooperative interrupt flag.

pub mod interrupt;
pub mod models;

pub use interrupt::{InterruptKind, ShutdownNotifier};
pub use models::*;
