/*
 * Property Summary & Verdict
 *
 * The result of one controller invocation. Every considered property ends
 * in exactly one of violated / satisfied / unknown; `unknown` is derived,
 * never stored independently.
 */

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::{MpaError, Result};
use crate::shared::models::{difference, format_set, intersection, PropertySet};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertySummary {
    considered: PropertySet,
    relevant: PropertySet,
    violated: PropertySet,
    satisfied: PropertySet,
    unknown: PropertySet,
}

impl PropertySummary {
    /// Summary of a run that checked `considered`
    ///
    /// # Errors
    /// `MpaError::InvariantViolation` if a property is both violated and
    /// satisfied or a verdict names a property outside `considered`.
    pub fn new(
        considered: PropertySet,
        relevant: PropertySet,
        violated: PropertySet,
        satisfied: PropertySet,
    ) -> Result<Self> {
        let both = intersection(&violated, &satisfied);
        if !both.is_empty() {
            return Err(MpaError::invariant(format!(
                "properties both violated and satisfied: {}",
                format_set(&both)
            )));
        }
        let stray: PropertySet = violated
            .union(&satisfied)
            .filter(|p| !considered.contains(*p))
            .cloned()
            .collect();
        if !stray.is_empty() {
            return Err(MpaError::invariant(format!(
                "verdicts for properties that were not considered: {}",
                format_set(&stray)
            )));
        }
        let resolved: PropertySet = violated.union(&satisfied).cloned().collect();
        let unknown = difference(&considered, &resolved);
        Ok(Self {
            considered,
            relevant,
            violated,
            satisfied,
            unknown,
        })
    }

    pub fn considered(&self) -> &PropertySet {
        &self.considered
    }

    /// Properties that were actually exercised by some run
    pub fn relevant(&self) -> &PropertySet {
        &self.relevant
    }

    pub fn violated(&self) -> &PropertySet {
        &self.violated
    }

    pub fn satisfied(&self) -> &PropertySet {
        &self.satisfied
    }

    pub fn unknown(&self) -> &PropertySet {
        &self.unknown
    }

    pub fn verdict(&self) -> VerificationResult {
        if self.considered.is_empty() {
            VerificationResult::NotYetStarted
        } else if !self.violated.is_empty() {
            VerificationResult::False
        } else if self.unknown.is_empty() {
            VerificationResult::True
        } else {
            VerificationResult::Unknown
        }
    }

    /// Status of every considered property, sorted by name
    pub fn report(&self) -> PropertyReport<'_> {
        PropertyReport { summary: self }
    }
}

/// Overall verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationResult {
    /// Every property satisfied
    True,
    /// At least one property violated
    False,
    Unknown,
    NotYetStarted,
}

impl fmt::Display for VerificationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            VerificationResult::True => "TRUE",
            VerificationResult::False => "FALSE",
            VerificationResult::Unknown => "UNKNOWN",
            VerificationResult::NotYetStarted => "NOT YET STARTED",
        };
        f.write_str(text)
    }
}

/// Printable status-by-property listing
pub struct PropertyReport<'a> {
    summary: &'a PropertySummary,
}

impl fmt::Display for PropertyReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.summary;
        writeln!(f, "Verification result: {}", s.verdict())?;
        for property in &s.considered {
            let status = if s.violated.contains(property) {
                "violated"
            } else if s.satisfied.contains(property) {
                "satisfied"
            } else {
                "unknown"
            };
            write!(f, "  {}: {}", property, status)?;
            if !s.relevant.contains(property) {
                f.write_str(" (irrelevant)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::property_set;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_is_derived() {
        let summary = PropertySummary::new(
            property_set(["a", "b", "c"]),
            property_set(["a"]),
            property_set(["a"]),
            property_set(["b"]),
        )
        .unwrap();
        assert_eq!(summary.unknown(), &property_set(["c"]));
        assert_eq!(summary.verdict(), VerificationResult::False);
    }

    #[test]
    fn test_overlap_rejected() {
        let err = PropertySummary::new(
            property_set(["a"]),
            PropertySet::new(),
            property_set(["a"]),
            property_set(["a"]),
        )
        .unwrap_err();
        assert!(matches!(err, MpaError::InvariantViolation(_)));
    }

    #[test]
    fn test_stray_verdict_rejected() {
        assert!(PropertySummary::new(
            property_set(["a"]),
            PropertySet::new(),
            property_set(["z"]),
            PropertySet::new(),
        )
        .is_err());
    }

    #[test]
    fn test_verdicts() {
        let all_safe = PropertySummary::new(
            property_set(["a"]),
            PropertySet::new(),
            PropertySet::new(),
            property_set(["a"]),
        )
        .unwrap();
        assert_eq!(all_safe.verdict(), VerificationResult::True);

        let open = PropertySummary::new(
            property_set(["a", "b"]),
            PropertySet::new(),
            PropertySet::new(),
            property_set(["a"]),
        )
        .unwrap();
        assert_eq!(open.verdict(), VerificationResult::Unknown);
        assert_eq!(
            PropertySummary::default().verdict(),
            VerificationResult::NotYetStarted
        );
    }

    #[test]
    fn test_report_sorted_with_irrelevant_marker() {
        let summary = PropertySummary::new(
            property_set(["double_unlock", "double_lock", "use_after_free"]),
            property_set(["double_lock", "use_after_free"]),
            property_set(["double_lock"]),
            property_set(["double_unlock"]),
        )
        .unwrap();
        let expected = "Verification result: FALSE\n\
                        \x20 double_lock: violated\n\
                        \x20 double_unlock: satisfied (irrelevant)\n\
                        \x20 use_after_free: unknown\n";
        assert_eq!(summary.report().to_string(), expected);
    }
}
