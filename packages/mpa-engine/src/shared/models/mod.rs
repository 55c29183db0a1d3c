//! Shared models used by every feature

pub mod cfa;
pub mod property;

pub use cfa::{Cfa, CfaBuilder, CfaEdge, CfaNode, EdgeKind, NodeId};
pub use property::{difference, format_set, intersection, property_set, Property, PropertySet};
