//! Precision-adjustment results

use super::precision::Precision;
use super::state::AbstractState;

/// What the driver should do after a precision adjustment.
///
/// Ordered by strength: combining actions keeps the strongest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Action {
    Continue,
    Break,
}

impl Action {
    /// Strongest-wins combination
    pub fn combine(self, other: Action) -> Action {
        self.max(other)
    }
}

/// Outcome of one precision-adjustment step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrecisionAdjustmentResult {
    pub state: AbstractState,
    pub precision: Precision,
    pub action: Action,
    /// Whether `state` is a new value (false: the input state was reused)
    pub state_changed: bool,
}

impl PrecisionAdjustmentResult {
    /// Input returned as-is
    pub fn unchanged(state: AbstractState, precision: Precision) -> Self {
        Self {
            state,
            precision,
            action: Action::Continue,
            state_changed: false,
        }
    }

    pub fn changed(state: AbstractState, precision: Precision) -> Self {
        Self {
            state,
            precision,
            action: Action::Continue,
            state_changed: true,
        }
    }

    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }
}
