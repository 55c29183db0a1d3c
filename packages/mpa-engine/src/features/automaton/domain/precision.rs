//! Automaton precision: the property blacklist

use std::sync::Arc;

use crate::shared::models::{Property, PropertySet};

/// Set of properties the automaton analysis must no longer track.
///
/// Compared and hashed by value, which is what the transition-relevance memo
/// table keys on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AutomatonPrecision {
    blacklist: Arc<PropertySet>,
}

impl AutomatonPrecision {
    /// Nothing blacklisted
    pub fn initial() -> Self {
        Self {
            blacklist: Arc::new(PropertySet::new()),
        }
    }

    pub fn with_blacklist(blacklist: PropertySet) -> Self {
        Self {
            blacklist: Arc::new(blacklist),
        }
    }

    pub fn blacklist(&self) -> &PropertySet {
        &self.blacklist
    }

    pub fn is_blacklisted(&self, property: &Property) -> bool {
        self.blacklist.contains(property)
    }

    /// True if `properties` is non-empty and every element is blacklisted.
    /// Transitions not tied to any property are never blacklisted.
    pub fn are_blacklisted(&self, properties: &PropertySet) -> bool {
        !properties.is_empty() && properties.iter().all(|p| self.blacklist.contains(p))
    }

    pub fn with_blacklisted(&self, properties: &PropertySet) -> Self {
        if properties.iter().all(|p| self.blacklist.contains(p)) {
            return self.clone();
        }
        let mut blacklist = (*self.blacklist).clone();
        blacklist.extend(properties.iter().cloned());
        Self::with_blacklist(blacklist)
    }
}

impl Default for AutomatonPrecision {
    fn default() -> Self {
        Self::initial()
    }
}
