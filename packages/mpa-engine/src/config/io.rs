//! Configuration I/O (YAML)
//!
//! Defines the YAML schema types. Loading and export live on
//! [`MpaConfig`](super::MpaConfig).

use serde::{Deserialize, Serialize};

use super::analysis_configs::*;

/// YAML Schema v1
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigExportV1 {
    /// Schema version (always 1 for v1)
    #[serde(default)]
    pub version: Option<u32>,

    /// Base preset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preset: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composite: Option<CompositeConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub automaton: Option<AutomatonConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partitioning: Option<PartitioningConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget: Option<BudgetConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sanity: Option<SanityConfig>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<DriverConfig>,
}
