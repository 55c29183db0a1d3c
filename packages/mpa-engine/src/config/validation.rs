//! Configuration validation
//!
//! Provides the `Validatable` trait and the cross-section checks of
//! [`MpaConfig`](super::MpaConfig).

use super::analysis_configs::PartitionOperatorKind;
use super::error::{ConfigError, ConfigResult};
use super::mpa_config::MpaConfig;

// ═══════════════════════════════════════════════════════════════════════════
// Validatable Trait
// ═══════════════════════════════════════════════════════════════════════════

/// Trait for validatable configuration objects
///
/// # Example
/// ```rust,ignore
/// use mpa_engine::config::Validatable;
///
/// fn install<C: Validatable>(config: C) -> Result<(), ConfigError> {
///     config.validate()?;
///     // ...
/// }
/// ```
pub trait Validatable {
    /// Validate the configuration
    ///
    /// Returns `Ok(())` if valid, `Err(ConfigError)` with details if invalid.
    fn validate(&self) -> ConfigResult<()>;

    /// Get the configuration name for error messages
    fn config_name(&self) -> &'static str {
        "Config"
    }
}

/// Extension trait for validating collections of configs
pub trait ValidatableCollection {
    /// Validate all configs in collection
    fn validate_all(&self) -> ConfigResult<()>;
}

impl<T: Validatable> ValidatableCollection for Vec<T> {
    fn validate_all(&self) -> ConfigResult<()> {
        for config in self {
            config.validate()?;
        }
        Ok(())
    }
}

impl<T: Validatable> ValidatableCollection for Option<T> {
    fn validate_all(&self) -> ConfigResult<()> {
        if let Some(config) = self {
            config.validate()?;
        }
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Cross-Section Validator
// ═══════════════════════════════════════════════════════════════════════════

/// Checks that span more than one section
pub struct CrossSectionValidator;

impl CrossSectionValidator {
    pub fn validate(config: &MpaConfig) -> ConfigResult<()> {
        if !config.driver.stop_after_error {
            return Err(ConfigError::conflict(
                "the restart loop needs the driver to return after every target state",
                "set driver.stop_after_error to true",
            ));
        }

        // Operators that may produce several partitions need a time limit.
        // The controller enforces this per partitioning; here it is only a hint.
        if config.partitioning.operator != PartitionOperatorKind::AllInOne
            && !config.budget.has_time_limit()
        {
            tracing::warn!(
                operator = ?config.partitioning.operator,
                "no time limit configured; partitionings with more than one partition will be rejected"
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preset;

    #[test]
    fn test_presets_pass_cross_validation() {
        for preset in [Preset::SingleRun, Preset::PerProperty, Preset::Adaptive] {
            let config = MpaConfig::preset(preset);
            assert!(CrossSectionValidator::validate(&config).is_ok());
        }
    }

    #[test]
    fn test_stop_after_error_required() {
        let config = MpaConfig::default().driver(|d| d.stop_after_error(false));
        let err = CrossSectionValidator::validate(&config).unwrap_err();
        assert!(err.to_string().contains("stop_after_error"));
    }

    #[test]
    fn test_validate_all_on_option() {
        let none: Option<crate::config::SanityConfig> = None;
        assert!(none.validate_all().is_ok());
    }
}
