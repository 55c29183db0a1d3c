/*
 * Composite Transfer Relation
 *
 * Successors are computed per component, combined, then strengthened with
 * the sibling components of each combination. If any component has no
 * successor the edge is infeasible for the product.
 *
 * Two combination strategies:
 * - full cross product of the component successor lists
 * - target-separating pairing, only on edges where some component reaches
 *   a target: every alternative successor of one component is paired with
 *   the base successor (first non-target one) of every other component.
 *   Targets stay apart without multiplying the other successors. Edges
 *   without a target successor always take the full cross product.
 */

use std::sync::Arc;

use crate::errors::Result;
use crate::features::composite::domain::CompositeState;
use crate::features::cpa::domain::{AbstractState, Precision};
use crate::features::cpa::ports::TransferRelation;
use crate::shared::models::CfaEdge;

use super::{precision_components, state_components};

pub struct CompositeTransferRelation {
    transfers: Vec<Arc<dyn TransferRelation>>,
    full_cross_product: bool,
}

impl CompositeTransferRelation {
    pub fn new(transfers: Vec<Arc<dyn TransferRelation>>) -> Self {
        Self {
            transfers,
            full_cross_product: true,
        }
    }

    /// Pair alternative successors with base successors on target edges
    pub fn without_full_cross_product(mut self) -> Self {
        self.full_cross_product = false;
        self
    }

    pub fn is_full_cross_product(&self) -> bool {
        self.full_cross_product
    }

    /// Successor tuples of `components` for `edge`, before strengthening
    fn combinations(
        &self,
        components: &[AbstractState],
        precisions: &[Precision],
        edge: &CfaEdge,
    ) -> Result<Vec<Vec<AbstractState>>> {
        let mut per_component: Vec<Vec<AbstractState>> = Vec::with_capacity(components.len());
        for ((transfer, state), precision) in self.transfers.iter().zip(components).zip(precisions) {
            let successors = transfer.successors_for_edge(state, precision, edge)?;
            if successors.is_empty() {
                return Ok(Vec::new());
            }
            per_component.push(successors);
        }

        let reaches_target = per_component.iter().flatten().any(AbstractState::is_target);
        if self.full_cross_product || !reaches_target {
            Ok(cross_product(&per_component))
        } else {
            Ok(target_separating_pairing(&per_component))
        }
    }

    fn strengthen(
        &self,
        combination: Vec<AbstractState>,
        precisions: &[Precision],
        edge: &CfaEdge,
    ) -> Result<Vec<Vec<AbstractState>>> {
        let mut results = vec![combination];
        for index in 0..self.transfers.len() {
            let mut next = Vec::with_capacity(results.len());
            for tuple in results {
                match self.transfers[index].strengthen(&tuple[index], &tuple, edge, &precisions[index])? {
                    None => next.push(tuple),
                    Some(alternatives) => {
                        for alternative in alternatives {
                            let mut refined = tuple.clone();
                            refined[index] = alternative;
                            next.push(refined);
                        }
                    }
                }
            }
            results = next;
        }
        Ok(results)
    }
}

fn cross_product(per_component: &[Vec<AbstractState>]) -> Vec<Vec<AbstractState>> {
    let mut result: Vec<Vec<AbstractState>> = vec![Vec::with_capacity(per_component.len())];
    for successors in per_component {
        let mut next = Vec::with_capacity(result.len() * successors.len());
        for prefix in &result {
            for successor in successors {
                let mut tuple = prefix.clone();
                tuple.push(successor.clone());
                next.push(tuple);
            }
        }
        result = next;
    }
    result
}

fn target_separating_pairing(per_component: &[Vec<AbstractState>]) -> Vec<Vec<AbstractState>> {
    // per component: the first non-target successor, else the first one
    let base_index: Vec<usize> = per_component
        .iter()
        .map(|successors| successors.iter().position(|s| !s.is_target()).unwrap_or(0))
        .collect();
    let base: Vec<AbstractState> = per_component
        .iter()
        .zip(&base_index)
        .map(|(successors, &i)| successors[i].clone())
        .collect();

    let mut result = vec![base.clone()];
    for (index, successors) in per_component.iter().enumerate() {
        for (position, successor) in successors.iter().enumerate() {
            if position == base_index[index] {
                continue;
            }
            let mut tuple = base.clone();
            tuple[index] = successor.clone();
            result.push(tuple);
        }
    }
    result
}

impl TransferRelation for CompositeTransferRelation {
    fn successors_for_edge(
        &self,
        state: &AbstractState,
        precision: &Precision,
        edge: &CfaEdge,
    ) -> Result<Vec<AbstractState>> {
        let arity = self.transfers.len();
        let components = state_components(state, arity)?;
        let precisions = precision_components(precision, arity)?;

        let mut successors = Vec::new();
        for combination in self.combinations(components, precisions, edge)? {
            for tuple in self.strengthen(combination, precisions, edge)? {
                successors.push(CompositeState::new(tuple).into());
            }
        }
        Ok(successors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::automaton::application::{new_budgeting_slot, AutomatonTransferRelation};
    use crate::features::automaton::domain::{
        Automaton, AutomatonState, EdgeMatcher, StateKind, TransitionSpec,
    };
    use crate::features::composite::domain::CompositePrecision;
    use crate::features::cpa::domain::LocationState;
    use crate::features::cpa::infrastructure::testing::{set_state, SetTransfer};
    use crate::features::cpa::infrastructure::LocationTransferRelation;
    use crate::features::mpa::domain::new_stats_handle;
    use crate::shared::models::{Cfa, NodeId};

    fn edge(label: &str) -> CfaEdge {
        let mut b = Cfa::builder("main");
        let n0 = b.entry();
        let n1 = b.add_node();
        b.statement(n0, n1, label);
        b.build().leaving_edges(n0)[0].clone()
    }

    fn state() -> AbstractState {
        CompositeState::new(vec![
            LocationState::new(NodeId::new(0)).into(),
            set_state(&[]),
            set_state(&[]),
        ])
        .into()
    }

    fn precision() -> Precision {
        CompositePrecision::new(vec![Precision::Static; 3]).into()
    }

    fn relation() -> CompositeTransferRelation {
        CompositeTransferRelation::new(vec![
            Arc::new(LocationTransferRelation),
            Arc::new(SetTransfer),
            Arc::new(SetTransfer),
        ])
    }

    #[test]
    fn test_single_successor() {
        let succ = relation()
            .successors_for_edge(&state(), &precision(), &edge("add 4"))
            .unwrap();
        assert_eq!(succ.len(), 1);
        let components = succ[0].as_composite().unwrap();
        assert_eq!(components.get(0).unwrap().location(), Some(NodeId::new(1)));
        assert_eq!(components.get(2), Some(&set_state(&[4])));
    }

    #[test]
    fn test_full_cross_product() {
        let succ = relation()
            .successors_for_edge(&state(), &precision(), &edge("fork"))
            .unwrap();
        assert_eq!(succ.len(), 4);
    }

    #[test]
    fn test_non_target_fork_keeps_every_combination() {
        let relation = relation().without_full_cross_product();
        assert!(!relation.is_full_cross_product());
        let succ = relation
            .successors_for_edge(&state(), &precision(), &edge("fork"))
            .unwrap();

        assert_eq!(succ.len(), 4);
        assert!(succ.iter().all(|s| !s.is_target()));
        let both_second = CompositeState::new(vec![
            LocationState::new(NodeId::new(1)).into(),
            set_state(&[101]),
            set_state(&[101]),
        ]);
        assert!(succ.contains(&both_second.into()));
    }

    /// Stays in `Watching` or reports `p` on every `fork` statement
    fn forking_automaton() -> Arc<Automaton> {
        Arc::new(
            Automaton::builder("Forking")
                .state("Watching", StateKind::Normal)
                .state("Error", StateKind::Target)
                .initial("Watching")
                .property("p")
                .transition(TransitionSpec::new(
                    "Watching",
                    EdgeMatcher::label("^fork$").unwrap(),
                    "Watching",
                ))
                .transition(TransitionSpec::new(
                    "Watching",
                    EdgeMatcher::label("^fork$").unwrap(),
                    "Error",
                ))
                .build()
                .unwrap(),
        )
    }

    fn target_relation(automaton: &Arc<Automaton>) -> CompositeTransferRelation {
        CompositeTransferRelation::new(vec![
            Arc::new(LocationTransferRelation),
            Arc::new(AutomatonTransferRelation::new(
                automaton.clone(),
                new_stats_handle(),
                new_budgeting_slot(),
            )),
            Arc::new(SetTransfer),
        ])
    }

    fn target_state(automaton: &Arc<Automaton>) -> AbstractState {
        CompositeState::new(vec![
            LocationState::new(NodeId::new(0)).into(),
            AutomatonState::initial(automaton.clone()).into(),
            set_state(&[]),
        ])
        .into()
    }

    #[test]
    fn test_target_edge_pairs_target_with_base_successors() {
        let automaton = forking_automaton();
        let relation = target_relation(&automaton).without_full_cross_product();

        let succ = relation
            .successors_for_edge(&target_state(&automaton), &precision(), &edge("fork"))
            .unwrap();

        // base, the target alternative, the set alternative
        assert_eq!(succ.len(), 3);
        let targets: Vec<&AbstractState> = succ.iter().filter(|s| s.is_target()).collect();
        assert_eq!(targets.len(), 1);
        let components = targets[0].as_composite().unwrap();
        assert_eq!(components.get(2), Some(&set_state(&[100])));
    }

    #[test]
    fn test_target_edge_full_cross_product() {
        let automaton = forking_automaton();
        let succ = target_relation(&automaton)
            .successors_for_edge(&target_state(&automaton), &precision(), &edge("fork"))
            .unwrap();
        assert_eq!(succ.len(), 4);
        assert_eq!(succ.iter().filter(|s| s.is_target()).count(), 2);
    }

    #[test]
    fn test_infeasible_component_prunes_product() {
        let succ = relation()
            .successors_for_edge(&state(), &precision(), &edge("kill"))
            .unwrap();
        assert!(succ.is_empty());
    }

    #[test]
    fn test_precision_arity_checked() {
        let short: Precision = CompositePrecision::new(vec![Precision::Static]).into();
        assert!(relation()
            .successors_for_edge(&state(), &short, &edge("x"))
            .is_err());
    }
}
