/*
 * Reachability Ports
 *
 * The driver contract the controller runs per partition. Interrupts and
 * fatal errors are data, not panics: callers branch on `RunOutcome`.
 */

use std::fmt;

use crate::errors::MpaError;
use crate::features::reachability::domain::ReachedSet;

/// Quality of an explored fragment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlgorithmStatus {
    pub sound: bool,
    pub precise: bool,
}

impl AlgorithmStatus {
    pub fn sound_and_precise() -> Self {
        Self {
            sound: true,
            precise: true,
        }
    }

    pub fn unsound() -> Self {
        Self {
            sound: false,
            precise: true,
        }
    }

    /// Component-wise conjunction
    pub fn and(self, other: AlgorithmStatus) -> Self {
        Self {
            sound: self.sound && other.sound,
            precise: self.precise && other.precise,
        }
    }
}

impl Default for AlgorithmStatus {
    fn default() -> Self {
        Self::sound_and_precise()
    }
}

/// Result of one driver run
#[derive(Debug)]
pub enum RunOutcome {
    /// Target found (with stop-after-error) or waitlist exhausted
    Finished(AlgorithmStatus),
    /// A temporary resource-limit interrupt was observed
    ResourceInterrupt,
    /// External shutdown was observed
    ExternalShutdown,
    Fatal(MpaError),
}

impl RunOutcome {
    pub fn is_finished(&self) -> bool {
        matches!(self, RunOutcome::Finished(_))
    }
}

impl fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunOutcome::Finished(status) => write!(
                f,
                "finished (sound: {}, precise: {})",
                status.sound, status.precise
            ),
            RunOutcome::ResourceInterrupt => write!(f, "interrupted by resource limit"),
            RunOutcome::ExternalShutdown => write!(f, "shut down"),
            RunOutcome::Fatal(e) => write!(f, "failed: {}", e),
        }
    }
}

/// Fixpoint exploration over a reached set and its waitlist
pub trait ReachabilityDriver: Send + Sync {
    fn run(&self, reached: &mut ReachedSet) -> RunOutcome;
}
