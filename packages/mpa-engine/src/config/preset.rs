//! Preset configurations
//!
//! Presets provide complete default configurations for common use cases.

use serde::{Deserialize, Serialize};

/// Configuration preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Preset {
    /// One partition with all properties, no time limit.
    ///
    /// Every property is resolved by a single exhaustive run (plus one
    /// continuation per violation found).
    SingleRun,

    /// One partition per property.
    ///
    /// - Single-property wall time: 60s
    PerProperty,

    /// All in one first, then cheaper-first halving with doubled budget.
    ///
    /// - Partition wall time: 300s
    /// - Single-property wall time: 60s
    Adaptive,
}

impl Preset {
    /// Parse preset from string
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "single_run" => Ok(Self::SingleRun),
            "per_property" => Ok(Self::PerProperty),
            "adaptive" => Ok(Self::Adaptive),
            _ => Err(format!(
                "Unknown preset '{}'. Valid presets: single_run, per_property, adaptive",
                s
            )),
        }
    }

    /// Convert to string
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SingleRun => "single_run",
            Self::PerProperty => "per_property",
            Self::Adaptive => "adaptive",
        }
    }
}

impl Default for Preset {
    fn default() -> Self {
        Self::Adaptive
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_parsing() {
        assert_eq!(Preset::from_str("single_run").unwrap(), Preset::SingleRun);
        assert_eq!(Preset::from_str("PER_PROPERTY").unwrap(), Preset::PerProperty);
        assert_eq!(Preset::from_str("adaptive").unwrap(), Preset::Adaptive);
        assert!(Preset::from_str("fast").is_err());
    }

    #[test]
    fn test_preset_display() {
        assert_eq!(Preset::SingleRun.to_string(), "single_run");
        assert_eq!(Preset::Adaptive.to_string(), "adaptive");
    }

    #[test]
    fn test_default_preset() {
        assert_eq!(Preset::default(), Preset::Adaptive);
    }
}
