//! Per-section configuration types
//!
//! Each section is a plain serde struct with `#[serde(default)]`, a range
//! check in `validate()` and chainable setters used by the closure builders
//! on [`MpaConfig`](super::MpaConfig).

use serde::{Deserialize, Serialize};

use super::error::{ConfigError, ConfigResult};
use super::validation::Validatable;

// ============================================================================
// Composite
// ============================================================================

/// Merge strategy of the composite analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompositeMergeKind {
    /// Merge only if every component agrees on the merged value
    Agree,
    /// Merge each component independently
    Plain,
}

impl Default for CompositeMergeKind {
    fn default() -> Self {
        Self::Agree
    }
}

/// Composite algebra configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CompositeConfig {
    /// Merge strategy when at least one component does not use merge-sep
    pub merge: CompositeMergeKind,

    /// Certificate-producing run (restricts merging, enables proof checking)
    pub in_proof_mode: bool,

    /// Keep successors of target-producing edges apart instead of building
    /// the full cross product
    pub separate_target_states: bool,
}

impl Default for CompositeConfig {
    fn default() -> Self {
        Self {
            merge: CompositeMergeKind::Agree,
            in_proof_mode: false,
            separate_target_states: false,
        }
    }
}

impl CompositeConfig {
    pub fn merge(mut self, merge: CompositeMergeKind) -> Self {
        self.merge = merge;
        self
    }

    pub fn in_proof_mode(mut self, enabled: bool) -> Self {
        self.in_proof_mode = enabled;
        self
    }

    pub fn separate_target_states(mut self, enabled: bool) -> Self {
        self.separate_target_states = enabled;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.in_proof_mode && self.merge == CompositeMergeKind::Plain {
            return Err(ConfigError::conflict(
                "merge 'plain' cannot be used when in_proof_mode is enabled",
                "set composite.merge to 'agree'",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Automaton
// ============================================================================

/// Property automaton configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AutomatonConfig {
    /// Apply the precision-driven relevant-transition filter
    pub adjust_transitions: bool,
}

impl Default for AutomatonConfig {
    fn default() -> Self {
        Self {
            adjust_transitions: true,
        }
    }
}

impl AutomatonConfig {
    pub fn adjust_transitions(mut self, enabled: bool) -> Self {
        self.adjust_transitions = enabled;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

// ============================================================================
// Partitioning
// ============================================================================

/// Partitioning operator selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartitionOperatorKind {
    /// One partition with every property; stop when it cannot finish
    AllInOne,
    /// One partition per property
    OneForEach,
    /// All in one, then cheaper-first halving with doubled budget
    CheaperFirstDivide,
    /// Repeated halving with the same budget
    Bisect,
}

impl Default for PartitionOperatorKind {
    fn default() -> Self {
        Self::CheaperFirstDivide
    }
}

/// Partition/restart configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PartitioningConfig {
    pub operator: PartitionOperatorKind,

    /// Call the component cache hooks before every fresh analysis
    pub clear_caches_on_restart: bool,

    /// Hard cap on restarts (None = unlimited)
    pub max_restarts: Option<usize>,
}

impl Default for PartitioningConfig {
    fn default() -> Self {
        Self {
            operator: PartitionOperatorKind::CheaperFirstDivide,
            clear_caches_on_restart: false,
            max_restarts: None,
        }
    }
}

impl PartitioningConfig {
    pub fn operator(mut self, operator: PartitionOperatorKind) -> Self {
        self.operator = operator;
        self
    }

    pub fn clear_caches_on_restart(mut self, enabled: bool) -> Self {
        self.clear_caches_on_restart = enabled;
        self
    }

    pub fn max_restarts(mut self, max: Option<usize>) -> Self {
        self.max_restarts = max;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_restarts == Some(0) {
            return Err(ConfigError::range_with_hint(
                "max_restarts",
                0,
                1,
                usize::MAX,
                "Use null to allow unlimited restarts",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Budget
// ============================================================================

/// Resource budget of one partition run.
///
/// All times are milliseconds; `None` means unlimited. The single-property
/// limits take precedence for partitions with exactly one property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BudgetConfig {
    pub partition_wall_time_ms: Option<u64>,
    pub partition_cpu_time_ms: Option<u64>,
    pub property_wall_time_ms: Option<u64>,
    pub property_cpu_time_ms: Option<u64>,

    /// Disable a property inside a run after this many target hits
    pub property_max_target_hits: Option<u32>,

    /// Polling interval of the resource-limit checker (1..=60000)
    pub limit_check_interval_ms: u64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            partition_wall_time_ms: None,
            partition_cpu_time_ms: None,
            property_wall_time_ms: None,
            property_cpu_time_ms: None,
            property_max_target_hits: None,
            limit_check_interval_ms: 100,
        }
    }
}

impl BudgetConfig {
    pub fn partition_wall_time_ms(mut self, ms: Option<u64>) -> Self {
        self.partition_wall_time_ms = ms;
        self
    }

    pub fn partition_cpu_time_ms(mut self, ms: Option<u64>) -> Self {
        self.partition_cpu_time_ms = ms;
        self
    }

    pub fn property_wall_time_ms(mut self, ms: Option<u64>) -> Self {
        self.property_wall_time_ms = ms;
        self
    }

    pub fn property_cpu_time_ms(mut self, ms: Option<u64>) -> Self {
        self.property_cpu_time_ms = ms;
        self
    }

    pub fn property_max_target_hits(mut self, hits: Option<u32>) -> Self {
        self.property_max_target_hits = hits;
        self
    }

    pub fn limit_check_interval_ms(mut self, ms: u64) -> Self {
        self.limit_check_interval_ms = ms;
        self
    }

    /// True if any time limit is set
    pub fn has_time_limit(&self) -> bool {
        self.partition_wall_time_ms.is_some()
            || self.partition_cpu_time_ms.is_some()
            || self.property_wall_time_ms.is_some()
            || self.property_cpu_time_ms.is_some()
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.limit_check_interval_ms == 0 || self.limit_check_interval_ms > 60_000 {
            return Err(ConfigError::range_with_hint(
                "limit_check_interval_ms",
                self.limit_check_interval_ms,
                1,
                60_000,
                "The resource-limit checker must poll at least once per minute",
            ));
        }

        let limits = [
            ("partition_wall_time_ms", self.partition_wall_time_ms),
            ("partition_cpu_time_ms", self.partition_cpu_time_ms),
            ("property_wall_time_ms", self.property_wall_time_ms),
            ("property_cpu_time_ms", self.property_cpu_time_ms),
        ];
        for (field, value) in limits {
            if value == Some(0) {
                return Err(ConfigError::range_with_hint(
                    field,
                    0,
                    1,
                    u64::MAX,
                    "Use null for an unlimited budget",
                ));
            }
        }

        if self.property_max_target_hits == Some(0) {
            return Err(ConfigError::range_with_hint(
                "property_max_target_hits",
                0,
                1,
                u32::MAX,
                "A property needs at least one target hit to be reported",
            ));
        }
        Ok(())
    }
}

// ============================================================================
// Sanity
// ============================================================================

/// Fixpoint sanity check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SanityConfig {
    /// Minimum reached-set size at a fixpoint
    pub min_fixpoint_states: usize,

    /// Abort instead of warning when the floor is not met
    pub strict: bool,
}

impl Default for SanityConfig {
    fn default() -> Self {
        Self {
            min_fixpoint_states: 10,
            strict: false,
        }
    }
}

impl SanityConfig {
    pub fn min_fixpoint_states(mut self, states: usize) -> Self {
        self.min_fixpoint_states = states;
        self
    }

    pub fn strict(mut self, enabled: bool) -> Self {
        self.strict = enabled;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

// ============================================================================
// Driver
// ============================================================================

/// Waitlist traversal order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WaitlistOrder {
    Bfs,
    Dfs,
}

impl Default for WaitlistOrder {
    fn default() -> Self {
        Self::Bfs
    }
}

/// Reachability driver configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriverConfig {
    pub waitlist_order: WaitlistOrder,

    /// Return after the first target state
    pub stop_after_error: bool,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            waitlist_order: WaitlistOrder::Bfs,
            stop_after_error: true,
        }
    }
}

impl DriverConfig {
    pub fn waitlist_order(mut self, order: WaitlistOrder) -> Self {
        self.waitlist_order = order;
        self
    }

    pub fn stop_after_error(mut self, enabled: bool) -> Self {
        self.stop_after_error = enabled;
        self
    }

    pub fn validate(&self) -> ConfigResult<()> {
        Ok(())
    }
}

// ============================================================================
// Validatable impls
// ============================================================================

impl Validatable for CompositeConfig {
    fn validate(&self) -> ConfigResult<()> {
        CompositeConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "CompositeConfig"
    }
}

impl Validatable for AutomatonConfig {
    fn validate(&self) -> ConfigResult<()> {
        AutomatonConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "AutomatonConfig"
    }
}

impl Validatable for PartitioningConfig {
    fn validate(&self) -> ConfigResult<()> {
        PartitioningConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "PartitioningConfig"
    }
}

impl Validatable for BudgetConfig {
    fn validate(&self) -> ConfigResult<()> {
        BudgetConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "BudgetConfig"
    }
}

impl Validatable for SanityConfig {
    fn validate(&self) -> ConfigResult<()> {
        SanityConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "SanityConfig"
    }
}

impl Validatable for DriverConfig {
    fn validate(&self) -> ConfigResult<()> {
        DriverConfig::validate(self)
    }

    fn config_name(&self) -> &'static str {
        "DriverConfig"
    }
}
