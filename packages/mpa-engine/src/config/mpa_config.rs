//! Top-level engine configuration

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::analysis_configs::*;
use super::error::{ConfigError, ConfigResult};
use super::io::ConfigExportV1;
use super::preset::Preset;
use super::validation::CrossSectionValidator;

/// Complete configuration of a multi-property analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MpaConfig {
    pub preset: Preset,
    pub composite: CompositeConfig,
    pub automaton: AutomatonConfig,
    pub partitioning: PartitioningConfig,
    pub budget: BudgetConfig,
    pub sanity: SanityConfig,
    pub driver: DriverConfig,
}

impl Default for MpaConfig {
    fn default() -> Self {
        Self::preset(Preset::default())
    }
}

impl MpaConfig {
    /// Level 1: complete configuration from a preset
    pub fn preset(preset: Preset) -> Self {
        let (partitioning, budget) = match preset {
            Preset::SingleRun => (
                PartitioningConfig::default().operator(PartitionOperatorKind::AllInOne),
                BudgetConfig::default(),
            ),
            Preset::PerProperty => (
                PartitioningConfig::default().operator(PartitionOperatorKind::OneForEach),
                BudgetConfig::default().property_wall_time_ms(Some(60_000)),
            ),
            Preset::Adaptive => (
                PartitioningConfig::default().operator(PartitionOperatorKind::CheaperFirstDivide),
                BudgetConfig::default()
                    .partition_wall_time_ms(Some(300_000))
                    .property_wall_time_ms(Some(60_000)),
            ),
        };

        Self {
            preset,
            composite: CompositeConfig::default(),
            automaton: AutomatonConfig::default(),
            partitioning,
            budget,
            sanity: SanityConfig::default(),
            driver: DriverConfig::default(),
        }
    }

    /// Level 2: override the composite section
    pub fn composite<F>(mut self, f: F) -> Self
    where
        F: FnOnce(CompositeConfig) -> CompositeConfig,
    {
        self.composite = f(self.composite);
        self
    }

    /// Level 2: override the automaton section
    pub fn automaton<F>(mut self, f: F) -> Self
    where
        F: FnOnce(AutomatonConfig) -> AutomatonConfig,
    {
        self.automaton = f(self.automaton);
        self
    }

    /// Level 2: override the partitioning section
    pub fn partitioning<F>(mut self, f: F) -> Self
    where
        F: FnOnce(PartitioningConfig) -> PartitioningConfig,
    {
        self.partitioning = f(self.partitioning);
        self
    }

    /// Level 2: override the budget section
    pub fn budget<F>(mut self, f: F) -> Self
    where
        F: FnOnce(BudgetConfig) -> BudgetConfig,
    {
        self.budget = f(self.budget);
        self
    }

    /// Level 2: override the sanity section
    pub fn sanity<F>(mut self, f: F) -> Self
    where
        F: FnOnce(SanityConfig) -> SanityConfig,
    {
        self.sanity = f(self.sanity);
        self
    }

    /// Level 2: override the driver section
    pub fn driver<F>(mut self, f: F) -> Self
    where
        F: FnOnce(DriverConfig) -> DriverConfig,
    {
        self.driver = f(self.driver);
        self
    }

    /// Validate all sections and cross-section constraints
    pub fn build(self) -> ConfigResult<ValidatedConfig> {
        self.composite.validate()?;
        self.automaton.validate()?;
        self.partitioning.validate()?;
        self.budget.validate()?;
        self.sanity.validate()?;
        self.driver.validate()?;

        CrossSectionValidator::validate(&self)?;

        Ok(ValidatedConfig(self))
    }

    /// Level 3: load from a YAML file
    pub fn from_yaml(path: impl AsRef<Path>) -> ConfigResult<ValidatedConfig> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&content)
    }

    /// Level 3: load from YAML text
    pub fn from_yaml_str(content: &str) -> ConfigResult<ValidatedConfig> {
        let export: ConfigExportV1 = serde_yaml::from_str(content)?;

        match export.version {
            None => return Err(ConfigError::MissingVersion),
            Some(1) => {}
            Some(found) => {
                return Err(ConfigError::UnsupportedVersion {
                    found,
                    supported: vec![1],
                })
            }
        }

        let preset = match export.preset.as_deref() {
            Some(name) => {
                Preset::from_str(name).map_err(|_| ConfigError::UnknownPreset(name.to_string()))?
            }
            None => Preset::default(),
        };

        let mut config = Self::preset(preset);
        if let Some(composite) = export.composite {
            config.composite = composite;
        }
        if let Some(automaton) = export.automaton {
            config.automaton = automaton;
        }
        if let Some(partitioning) = export.partitioning {
            config.partitioning = partitioning;
        }
        if let Some(budget) = export.budget {
            config.budget = budget;
        }
        if let Some(sanity) = export.sanity {
            config.sanity = sanity;
        }
        if let Some(driver) = export.driver {
            config.driver = driver;
        }

        config.build()
    }

    /// Export as YAML v1
    pub fn to_yaml(&self) -> ConfigResult<String> {
        let export = ConfigExportV1 {
            version: Some(1),
            preset: Some(self.preset.to_string()),
            composite: Some(self.composite.clone()),
            automaton: Some(self.automaton.clone()),
            partitioning: Some(self.partitioning.clone()),
            budget: Some(self.budget.clone()),
            sanity: Some(self.sanity.clone()),
            driver: Some(self.driver.clone()),
        };

        serde_yaml::to_string(&export).map_err(ConfigError::Yaml)
    }
}

/// Validated configuration (immutable, safe to use)
#[derive(Debug, Clone)]
pub struct ValidatedConfig(MpaConfig);

impl ValidatedConfig {
    /// Unwrap the validated config to get the inner MpaConfig
    pub fn into_inner(self) -> MpaConfig {
        self.0
    }

    /// Get a reference to the inner MpaConfig
    pub fn as_inner(&self) -> &MpaConfig {
        &self.0
    }
}

impl std::ops::Deref for ValidatedConfig {
    type Target = MpaConfig;

    fn deref(&self) -> &MpaConfig {
        &self.0
    }
}
