//! Configuration System
//!
//! Three levels, as everywhere in this workspace:
//! - Level 1: Preset - one-liner
//! - Level 2: Section override - closure builders
//! - Level 3: YAML - complete control
//!
//! # Examples
//!
//! ```rust,ignore
//! use mpa_engine::config::{MpaConfig, Preset};
//!
//! // Level 1
//! let config = MpaConfig::preset(Preset::PerProperty).build()?;
//!
//! // Level 2
//! let config = MpaConfig::preset(Preset::Adaptive)
//!     .budget(|b| b.partition_cpu_time_ms(Some(120_000)))
//!     .sanity(|s| s.strict(true))
//!     .build()?;
//!
//! // Level 3
//! let config = MpaConfig::from_yaml("mpa.yaml")?;
//! ```

pub mod analysis_configs;
pub mod error;
pub mod io;
pub mod mpa_config;
pub mod preset;
pub mod validation;

// Re-exports
pub use analysis_configs::{
    AutomatonConfig, BudgetConfig, CompositeConfig, CompositeMergeKind, DriverConfig,
    PartitionOperatorKind, PartitioningConfig, SanityConfig, WaitlistOrder,
};
pub use error::{ConfigError, ConfigResult};
pub use io::ConfigExportV1;
pub use mpa_config::{MpaConfig, ValidatedConfig};
pub use preset::Preset;
pub use validation::{CrossSectionValidator, Validatable, ValidatableCollection};
