//! Product states and precisions

use std::fmt;
use std::sync::Arc;

use crate::errors::{MpaError, Result};
use crate::features::cpa::domain::{AbstractState, Precision};

/// Ordered tuple of component states; the order is fixed by the analysis
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeState {
    components: Arc<[AbstractState]>,
}

impl CompositeState {
    pub fn new(components: Vec<AbstractState>) -> Self {
        Self {
            components: Arc::from(components),
        }
    }

    pub fn components(&self) -> &[AbstractState] {
        &self.components
    }

    pub fn get(&self, index: usize) -> Option<&AbstractState> {
        self.components.get(index)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Copy with component `index` replaced
    pub fn with_component(&self, index: usize, state: AbstractState) -> Result<Self> {
        if index >= self.components.len() {
            return Err(MpaError::usage(format!(
                "component index {} out of range for a {}-tuple",
                index,
                self.components.len()
            )));
        }
        let mut components = self.components.to_vec();
        components[index] = state;
        Ok(Self::new(components))
    }
}

impl fmt::Display for CompositeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, component) in self.components.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", component.kind_name())?;
            if let Some(automaton) = component.as_automaton() {
                write!(f, " {}", automaton)?;
            }
        }
        write!(f, ")")
    }
}

/// Ordered tuple of component precisions, aligned with [`CompositeState`]
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositePrecision {
    components: Arc<[Precision]>,
}

impl CompositePrecision {
    pub fn new(components: Vec<Precision>) -> Self {
        Self {
            components: Arc::from(components),
        }
    }

    pub fn components(&self) -> &[Precision] {
        &self.components
    }

    pub fn get(&self, index: usize) -> Option<&Precision> {
        self.components.get(index)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::cpa::domain::LocationState;
    use crate::shared::models::NodeId;

    #[test]
    fn test_with_component() {
        let state = CompositeState::new(vec![
            LocationState::new(NodeId::new(0)).into(),
            LocationState::new(NodeId::new(1)).into(),
        ]);
        let updated = state
            .with_component(1, LocationState::new(NodeId::new(2)).into())
            .unwrap();

        assert_eq!(updated.get(0), state.get(0));
        assert_eq!(updated.get(1).and_then(|s| s.location()), Some(NodeId::new(2)));
        assert!(state
            .with_component(5, LocationState::new(NodeId::new(3)).into())
            .is_err());
    }
}
