//! Safety properties
//!
//! A property is identified by its name; sets of properties are ordered so
//! that every report and log line lists them deterministically.

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// A named, checkable safety condition
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Property {
    name: Arc<str>,
}

impl Property {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self {
            name: Arc::from(name.as_ref()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

impl fmt::Display for Property {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

impl From<&str> for Property {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Ordered set of properties
pub type PropertySet = BTreeSet<Property>;

/// Build a property set from names
pub fn property_set<I, S>(names: I) -> PropertySet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    names.into_iter().map(Property::new).collect()
}

/// `a − b`
pub fn difference(a: &PropertySet, b: &PropertySet) -> PropertySet {
    a.difference(b).cloned().collect()
}

/// `a ∩ b`
pub fn intersection(a: &PropertySet, b: &PropertySet) -> PropertySet {
    a.intersection(b).cloned().collect()
}

/// Render a set as `{a, b, c}`
pub fn format_set(set: &PropertySet) -> String {
    let names: Vec<&str> = set.iter().map(Property::name).collect();
    format!("{{{}}}", names.join(", "))
}
