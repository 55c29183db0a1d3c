/*
 * Precisions
 *
 * Per-analysis configuration that can be narrowed between steps. The only
 * precision with engine-level meaning is the automaton property blacklist;
 * every operation here that talks about blacklists walks the precision tree
 * and touches automaton precisions only.
 */

use crate::features::automaton::domain::AutomatonPrecision;
use crate::features::composite::domain::CompositePrecision;
use crate::shared::models::PropertySet;

use super::state::ValueState;

/// Precision of any analysis in the engine
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Precision {
    /// Analyses without a refinable precision
    Static,
    /// Property blacklist of an automaton analysis
    Automaton(AutomatonPrecision),
    /// Product of component precisions
    Composite(CompositePrecision),
    /// Opaque precision of a plugged-in component
    Value(ValueState),
}

impl Precision {
    /// Union of the blacklists of every automaton precision in this tree
    pub fn blacklisted_properties(&self) -> PropertySet {
        let mut result = PropertySet::new();
        self.collect_blacklisted(&mut result);
        result
    }

    fn collect_blacklisted(&self, into: &mut PropertySet) {
        match self {
            Precision::Automaton(p) => into.extend(p.blacklist().iter().cloned()),
            Precision::Composite(c) => {
                for component in c.components().iter() {
                    component.collect_blacklisted(into);
                }
            }
            Precision::Static | Precision::Value(_) => {}
        }
    }

    /// Copy of this precision with `properties` added to every automaton blacklist
    pub fn with_blacklisted(&self, properties: &PropertySet) -> Precision {
        if properties.is_empty() {
            return self.clone();
        }
        match self {
            Precision::Automaton(p) => Precision::Automaton(p.with_blacklisted(properties)),
            Precision::Composite(c) => Precision::Composite(CompositePrecision::new(
                c.components()
                    .iter()
                    .map(|component| component.with_blacklisted(properties))
                    .collect(),
            )),
            Precision::Static | Precision::Value(_) => self.clone(),
        }
    }

    pub fn as_automaton(&self) -> Option<&AutomatonPrecision> {
        match self {
            Precision::Automaton(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_composite(&self) -> Option<&CompositePrecision> {
        match self {
            Precision::Composite(c) => Some(c),
            _ => None,
        }
    }
}

impl From<AutomatonPrecision> for Precision {
    fn from(precision: AutomatonPrecision) -> Self {
        Precision::Automaton(precision)
    }
}

impl From<CompositePrecision> for Precision {
    fn from(precision: CompositePrecision) -> Self {
        Precision::Composite(precision)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::property_set;

    #[test]
    fn test_blacklist_walks_composite() {
        let precision = Precision::Composite(CompositePrecision::new(vec![
            Precision::Static,
            Precision::Automaton(AutomatonPrecision::initial()),
            Precision::Automaton(AutomatonPrecision::initial()),
        ]));

        let updated = precision.with_blacklisted(&property_set(["p1"]));
        assert_eq!(updated.blacklisted_properties(), property_set(["p1"]));

        let components = updated.as_composite().unwrap().components();
        assert_eq!(components[0], Precision::Static);
        assert!(components[1]
            .as_automaton()
            .unwrap()
            .is_blacklisted(&"p1".into()));
    }

    #[test]
    fn test_empty_blacklist_update_is_identity() {
        let precision = Precision::Automaton(AutomatonPrecision::initial());
        assert_eq!(precision.with_blacklisted(&PropertySet::new()), precision);
    }
}
