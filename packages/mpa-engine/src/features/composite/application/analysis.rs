/*
 * Composite Analysis
 *
 * Assembles an ordered list of component analyses into one product
 * analysis. All operator tables are built here, once; hot paths never
 * inspect component kinds again.
 *
 * Operator selection:
 * - merge: sep if every component merges sep, otherwise agree (optionally
 *   in proof mode) or plain, per configuration
 * - precision adjustment: simple if every component is simple
 * - transfer: full cross product unless target successors are kept apart
 * - reducer: only if every component has one
 */

use std::sync::Arc;

use tracing::debug;

use crate::config::{CompositeConfig, CompositeMergeKind};
use crate::errors::{MpaError, Result};
use crate::features::composite::domain::{CompositePrecision, CompositeState};
use crate::features::composite::infrastructure::{
    CompositeDomain, CompositeMergeAgreeOperator, CompositeMergePlainOperator,
    CompositePrecisionAdjustment, CompositeProofChecker, CompositeReducer,
    CompositeSimplePrecisionAdjustment, CompositeStopOperator, CompositeTransferRelation,
};
use crate::features::cpa::domain::{AbstractState, Precision};
use crate::features::cpa::infrastructure::MergeSepOperator;
use crate::features::cpa::ports::{
    AbstractDomain, ConfigurableProgramAnalysis, MergeOperator, PrecisionAdjustmentOp,
    ProofChecker, Reducer, StopOperator, TransferRelation,
};
use crate::features::mpa::ports::PropertyBudgeting;
use crate::shared::models::{NodeId, PropertySet};

pub struct CompositeAnalysis {
    name: String,
    components: Vec<Arc<dyn ConfigurableProgramAnalysis>>,
    domain: Arc<CompositeDomain>,
    transfer: Arc<CompositeTransferRelation>,
    merge: Arc<dyn MergeOperator>,
    stop: Arc<CompositeStopOperator>,
    adjustment: PrecisionAdjustmentOp,
    reducer: Option<Arc<CompositeReducer>>,
    proof_checker: Arc<CompositeProofChecker>,
}

impl CompositeAnalysis {
    /// # Errors
    /// `MpaError::InvalidAnalysis` for an empty component list,
    /// `MpaError::Config` for an invalid configuration.
    pub fn new(
        components: Vec<Arc<dyn ConfigurableProgramAnalysis>>,
        config: &CompositeConfig,
    ) -> Result<Self> {
        if components.is_empty() {
            return Err(MpaError::invalid_analysis(
                "composite analysis needs at least one component",
            ));
        }
        config.validate()?;

        let arity = components.len();
        let domains: Vec<Arc<dyn AbstractDomain>> =
            components.iter().map(|c| c.abstract_domain()).collect();
        let merges: Vec<Arc<dyn MergeOperator>> =
            components.iter().map(|c| c.merge_operator()).collect();
        let stops: Vec<Arc<dyn StopOperator>> =
            components.iter().map(|c| c.stop_operator()).collect();
        let transfers: Vec<Arc<dyn TransferRelation>> =
            components.iter().map(|c| c.transfer_relation()).collect();
        let adjustments: Vec<PrecisionAdjustmentOp> =
            components.iter().map(|c| c.precision_adjustment()).collect();

        let merge: Arc<dyn MergeOperator> = if merges.iter().all(|m| m.is_sep()) {
            Arc::new(MergeSepOperator)
        } else {
            match config.merge {
                CompositeMergeKind::Agree => {
                    let agree = CompositeMergeAgreeOperator::new(
                        merges,
                        stops.clone(),
                        domains.clone(),
                    );
                    if config.in_proof_mode {
                        Arc::new(agree.in_proof_mode())
                    } else {
                        Arc::new(agree)
                    }
                }
                CompositeMergeKind::Plain => Arc::new(CompositeMergePlainOperator::new(merges)),
            }
        };

        let adjustment = if adjustments.iter().all(PrecisionAdjustmentOp::is_simple) {
            let simple = adjustments
                .into_iter()
                .filter_map(|op| match op {
                    PrecisionAdjustmentOp::Simple(simple) => Some(simple),
                    PrecisionAdjustmentOp::Full(_) => None,
                })
                .collect();
            PrecisionAdjustmentOp::Simple(Arc::new(CompositeSimplePrecisionAdjustment::new(simple)))
        } else {
            PrecisionAdjustmentOp::Full(Arc::new(CompositePrecisionAdjustment::new(adjustments)))
        };

        let mut transfer = CompositeTransferRelation::new(transfers);
        if config.separate_target_states {
            transfer = transfer.without_full_cross_product();
        }
        let transfer = Arc::new(transfer);
        let stop = Arc::new(CompositeStopOperator::new(stops));

        let reducer = CompositeReducer::from_components(
            components.iter().map(|c| c.reducer()).collect(),
        )
        .map(Arc::new);

        let name = format!(
            "CompositeAnalysis[{}]",
            components
                .iter()
                .map(|c| c.name().to_string())
                .collect::<Vec<_>>()
                .join(", ")
        );
        debug!(
            analysis = %name,
            merge_sep = merge.is_sep(),
            simple_adjustment = adjustment.is_simple(),
            reducer = reducer.is_some(),
            "assembled composite analysis"
        );

        Ok(Self {
            name,
            domain: Arc::new(CompositeDomain::new(domains)),
            proof_checker: Arc::new(CompositeProofChecker::new(
                transfer.clone(),
                stop.clone(),
                arity,
            )),
            transfer,
            merge,
            stop,
            adjustment,
            reducer,
            components,
        })
    }

    pub fn components(&self) -> &[Arc<dyn ConfigurableProgramAnalysis>] {
        &self.components
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Component-wise coverage
    pub fn is_covered_by(
        &self,
        state: &AbstractState,
        other: &AbstractState,
        precision: &Precision,
    ) -> Result<bool> {
        self.stop.is_covered_by(state, other, precision)
    }
}

impl ConfigurableProgramAnalysis for CompositeAnalysis {
    fn name(&self) -> &str {
        &self.name
    }

    fn abstract_domain(&self) -> Arc<dyn AbstractDomain> {
        self.domain.clone()
    }

    fn transfer_relation(&self) -> Arc<dyn TransferRelation> {
        self.transfer.clone()
    }

    fn merge_operator(&self) -> Arc<dyn MergeOperator> {
        self.merge.clone()
    }

    fn stop_operator(&self) -> Arc<dyn StopOperator> {
        self.stop.clone()
    }

    fn precision_adjustment(&self) -> PrecisionAdjustmentOp {
        self.adjustment.clone()
    }

    fn reducer(&self) -> Option<Arc<dyn Reducer>> {
        self.reducer
            .as_ref()
            .map(|r| r.clone() as Arc<dyn Reducer>)
    }

    fn proof_checker(&self) -> Option<Arc<dyn ProofChecker>> {
        Some(self.proof_checker.clone())
    }

    fn initial_state(&self, node: NodeId) -> Result<AbstractState> {
        let states = self
            .components
            .iter()
            .map(|c| c.initial_state(node))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompositeState::new(states).into())
    }

    fn initial_precision(&self, node: NodeId) -> Result<Precision> {
        let precisions = self
            .components
            .iter()
            .map(|c| c.initial_precision(node))
            .collect::<Result<Vec<_>>>()?;
        Ok(CompositePrecision::new(precisions).into())
    }

    fn encoded_properties(&self) -> PropertySet {
        self.components
            .iter()
            .flat_map(|c| c.encoded_properties())
            .collect()
    }

    fn clear_caches(&self) {
        for component in &self.components {
            component.clear_caches();
        }
    }

    fn set_property_budgeting(&self, budgeting: Arc<dyn PropertyBudgeting>) {
        for component in &self.components {
            component.set_property_budgeting(budgeting.clone());
        }
    }
}
