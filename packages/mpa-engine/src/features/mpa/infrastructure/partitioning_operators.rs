/*
 * Partitioning Operators
 *
 * Strategies for grouping the properties still to check:
 * - AllInOneOperator: one batch, no second chance
 * - OneForEachOperator: one batch per property, cheapest first
 * - CheaperFirstDivideOperator: all in one, then the cheaper half first
 *   with doubled budget, then one for each, then stop
 * - BisectOperator: halve the largest batch until singletons
 *
 * Disabled properties are left out of every batch.
 */

use std::sync::Arc;

use crate::config::{BudgetConfig, PartitionOperatorKind};
use crate::features::mpa::domain::{Partitioning, PartitioningStatus, RefinementOrder};
use crate::features::mpa::ports::{
    PartitionBudgeting, PartitioningError, PartitioningOperator, PropertyBudgeting,
};
use crate::shared::models::{difference, Property, PropertySet};

use super::budgeting::{property_budgeting_from_config, BasicPartitionBudgeting};

type PartitionResult = std::result::Result<Partitioning, PartitioningError>;

#[derive(Debug, Clone)]
struct Budgets {
    partition: Arc<dyn PartitionBudgeting>,
    property: Arc<dyn PropertyBudgeting>,
}

impl Budgets {
    fn from_config(config: &BudgetConfig) -> Self {
        Self {
            partition: Arc::new(BasicPartitionBudgeting::from_config(config)),
            property: property_budgeting_from_config(config),
        }
    }

    fn partitioning(&self, status: PartitioningStatus, partitions: Vec<PropertySet>) -> Partitioning {
        self.partitioning_with(status, partitions, self.partition.clone())
    }

    fn partitioning_with(
        &self,
        status: PartitioningStatus,
        partitions: Vec<PropertySet>,
        partition: Arc<dyn PartitionBudgeting>,
    ) -> Partitioning {
        Partitioning::new(status, partitions, partition, self.property.clone())
    }
}

fn candidates(
    to_check: &PropertySet,
    disabled: &PropertySet,
) -> std::result::Result<PropertySet, PartitioningError> {
    let result = difference(to_check, disabled);
    if result.is_empty() {
        Err(PartitioningError::NothingToCheck)
    } else {
        Ok(result)
    }
}

fn singletons(sorted: Vec<Property>) -> Vec<PropertySet> {
    sorted.into_iter().map(|p| PropertySet::from([p])).collect()
}

/// Consecutive chunks of at most `size` properties
fn chunks(sorted: &[Property], size: usize) -> Vec<PropertySet> {
    sorted
        .chunks(size.max(1))
        .map(|chunk| chunk.iter().cloned().collect())
        .collect()
}

// ═══════════════════════════════════════════════════════════════════════════
// All in one
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct AllInOneOperator {
    budgets: Budgets,
}

impl AllInOneOperator {
    pub fn new(
        partition_budgeting: Arc<dyn PartitionBudgeting>,
        property_budgeting: Arc<dyn PropertyBudgeting>,
    ) -> Self {
        Self {
            budgets: Budgets {
                partition: partition_budgeting,
                property: property_budgeting,
            },
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self {
            budgets: Budgets::from_config(config),
        }
    }
}

impl PartitioningOperator for AllInOneOperator {
    fn name(&self) -> &str {
        "all_in_one"
    }

    fn partition(
        &self,
        last: &Partitioning,
        to_check: &PropertySet,
        disabled: &PropertySet,
        _order: &RefinementOrder,
    ) -> PartitionResult {
        let properties = candidates(to_check, disabled)?;
        Ok(match last.status() {
            PartitioningStatus::None => self
                .budgets
                .partitioning(PartitioningStatus::AllInOne, vec![properties]),
            _ => last.to_break(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// One for each
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct OneForEachOperator {
    budgets: Budgets,
}

impl OneForEachOperator {
    pub fn new(
        partition_budgeting: Arc<dyn PartitionBudgeting>,
        property_budgeting: Arc<dyn PropertyBudgeting>,
    ) -> Self {
        Self {
            budgets: Budgets {
                partition: partition_budgeting,
                property: property_budgeting,
            },
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self {
            budgets: Budgets::from_config(config),
        }
    }
}

impl PartitioningOperator for OneForEachOperator {
    fn name(&self) -> &str {
        "one_for_each"
    }

    fn partition(
        &self,
        last: &Partitioning,
        to_check: &PropertySet,
        disabled: &PropertySet,
        order: &RefinementOrder,
    ) -> PartitionResult {
        let properties = candidates(to_check, disabled)?;
        Ok(match last.status() {
            PartitioningStatus::None => self.budgets.partitioning(
                PartitioningStatus::OneForEach,
                singletons(order.sorted(&properties)),
            ),
            _ => last.to_break(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Cheaper first, divide
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CheaperFirstDivideOperator {
    budgets: Budgets,
}

impl CheaperFirstDivideOperator {
    pub fn new(
        partition_budgeting: Arc<dyn PartitionBudgeting>,
        property_budgeting: Arc<dyn PropertyBudgeting>,
    ) -> Self {
        Self {
            budgets: Budgets {
                partition: partition_budgeting,
                property: property_budgeting,
            },
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self {
            budgets: Budgets::from_config(config),
        }
    }
}

impl PartitioningOperator for CheaperFirstDivideOperator {
    fn name(&self) -> &str {
        "cheaper_first_divide"
    }

    fn partition(
        &self,
        last: &Partitioning,
        to_check: &PropertySet,
        disabled: &PropertySet,
        order: &RefinementOrder,
    ) -> PartitionResult {
        let properties = candidates(to_check, disabled)?;
        let sorted = order.sorted(&properties);

        Ok(match last.status() {
            PartitioningStatus::None => self
                .budgets
                .partitioning(PartitioningStatus::AllInOne, vec![properties]),
            PartitioningStatus::AllInOne if sorted.len() > 1 => {
                let half = (sorted.len() + 1) / 2;
                self.budgets.partitioning_with(
                    PartitioningStatus::CheaperFirstBisect,
                    chunks(&sorted, half),
                    last.partition_budgeting().budget_times_two(),
                )
            }
            PartitioningStatus::AllInOne | PartitioningStatus::CheaperFirstBisect => {
                self.budgets.partitioning_with(
                    PartitioningStatus::OneForEach,
                    singletons(sorted),
                    last.partition_budgeting().clone(),
                )
            }
            _ => last.to_break(),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// Bisect
// ═══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct BisectOperator {
    budgets: Budgets,
}

impl BisectOperator {
    pub fn new(
        partition_budgeting: Arc<dyn PartitionBudgeting>,
        property_budgeting: Arc<dyn PropertyBudgeting>,
    ) -> Self {
        Self {
            budgets: Budgets {
                partition: partition_budgeting,
                property: property_budgeting,
            },
        }
    }

    pub fn from_config(config: &BudgetConfig) -> Self {
        Self {
            budgets: Budgets::from_config(config),
        }
    }
}

impl PartitioningOperator for BisectOperator {
    fn name(&self) -> &str {
        "bisect"
    }

    fn partition(
        &self,
        last: &Partitioning,
        to_check: &PropertySet,
        disabled: &PropertySet,
        order: &RefinementOrder,
    ) -> PartitionResult {
        let properties = candidates(to_check, disabled)?;
        if last.status() == PartitioningStatus::None {
            return Ok(self
                .budgets
                .partitioning(PartitioningStatus::AllInOne, vec![properties]));
        }

        let largest = last
            .iter()
            .map(PropertySet::len)
            .max()
            .unwrap_or(properties.len());
        if largest <= 1 || last.status() == PartitioningStatus::Break {
            return Ok(last.to_break());
        }
        let sorted = order.sorted(&properties);
        Ok(self.budgets.partitioning(
            PartitioningStatus::MorePartitions,
            chunks(&sorted, (largest + 1) / 2),
        ))
    }
}

/// Operator selected by `kind`, budgeted by `budget`
pub fn partitioning_operator_from_config(
    kind: PartitionOperatorKind,
    budget: &BudgetConfig,
) -> Arc<dyn PartitioningOperator> {
    match kind {
        PartitionOperatorKind::AllInOne => Arc::new(AllInOneOperator::from_config(budget)),
        PartitionOperatorKind::OneForEach => Arc::new(OneForEachOperator::from_config(budget)),
        PartitionOperatorKind::CheaperFirstDivide => {
            Arc::new(CheaperFirstDivideOperator::from_config(budget))
        }
        PartitionOperatorKind::Bisect => Arc::new(BisectOperator::from_config(budget)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::models::property_set;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn budget() -> BudgetConfig {
        BudgetConfig::default()
            .partition_cpu_time_ms(Some(1_000))
            .property_cpu_time_ms(Some(500))
    }

    fn order() -> RefinementOrder {
        RefinementOrder::from_costs([
            (Property::new("a"), 40),
            (Property::new("b"), 10),
            (Property::new("c"), 30),
            (Property::new("d"), 20),
        ])
    }

    #[test]
    fn test_all_in_one_then_break() {
        let op = AllInOneOperator::from_config(&budget());
        let all = property_set(["a", "b", "c"]);
        let first = op
            .partition(&Partitioning::none(), &all, &PropertySet::new(), &order())
            .unwrap();
        assert_eq!(first.status(), PartitioningStatus::AllInOne);
        assert_eq!(first.partitions(), &[all.clone()]);

        let next = op.partition(&first, &all, &PropertySet::new(), &order()).unwrap();
        assert_eq!(next.status(), PartitioningStatus::Break);
        assert!(next.is_empty());
    }

    #[test]
    fn test_one_for_each_cheapest_first() {
        let op = OneForEachOperator::from_config(&budget());
        let p = op
            .partition(
                &Partitioning::none(),
                &property_set(["a", "b", "c", "d"]),
                &PropertySet::new(),
                &order(),
            )
            .unwrap();
        let firsts: Vec<&str> = p
            .iter()
            .map(|s| s.iter().next().unwrap().name())
            .collect();
        assert_eq!(firsts, vec!["b", "d", "c", "a"]);
        assert!(p.has_required_limits());
    }

    #[test]
    fn test_cheaper_first_divide_sequence() {
        let op = CheaperFirstDivideOperator::from_config(&budget());
        let all = property_set(["a", "b", "c", "d"]);
        let none = PropertySet::new();

        let first = op.partition(&Partitioning::none(), &all, &none, &order()).unwrap();
        assert_eq!(first.status(), PartitioningStatus::AllInOne);

        let second = op.partition(&first, &all, &none, &order()).unwrap();
        assert_eq!(second.status(), PartitioningStatus::CheaperFirstBisect);
        assert_eq!(
            second.partitions(),
            &[property_set(["b", "d"]), property_set(["a", "c"])]
        );
        assert_eq!(
            second.partition_budgeting().cpu_time_limit(2),
            Some(Duration::from_secs(2))
        );

        let third = op.partition(&second, &all, &none, &order()).unwrap();
        assert_eq!(third.status(), PartitioningStatus::OneForEach);
        assert_eq!(third.partition_count(), 4);
        assert_eq!(
            third.partition_budgeting().cpu_time_limit(1),
            Some(Duration::from_secs(1))
        );

        let fourth = op.partition(&third, &all, &none, &order()).unwrap();
        assert_eq!(fourth.status(), PartitioningStatus::Break);
    }

    #[test]
    fn test_disabled_properties_left_out() {
        let op = CheaperFirstDivideOperator::from_config(&budget());
        let p = op
            .partition(
                &Partitioning::none(),
                &property_set(["a", "b"]),
                &property_set(["a"]),
                &order(),
            )
            .unwrap();
        assert_eq!(p.partitions(), &[property_set(["b"])]);

        let err = op
            .partition(
                &Partitioning::none(),
                &property_set(["a"]),
                &property_set(["a"]),
                &order(),
            )
            .unwrap_err();
        assert!(matches!(err, PartitioningError::NothingToCheck));
    }

    #[test]
    fn test_bisect_halves_until_singletons() {
        let op = BisectOperator::from_config(&budget());
        let all = property_set(["a", "b", "c", "d"]);
        let none = PropertySet::new();

        let mut p = op.partition(&Partitioning::none(), &all, &none, &order()).unwrap();
        let mut sizes = Vec::new();
        while p.status() != PartitioningStatus::Break {
            sizes.push(p.iter().map(PropertySet::len).max().unwrap());
            p = op.partition(&p, &all, &none, &order()).unwrap();
        }
        assert_eq!(sizes, vec![4, 2, 1]);
    }

    #[test]
    fn test_from_config_names() {
        let b = budget();
        assert_eq!(
            partitioning_operator_from_config(PartitionOperatorKind::Bisect, &b).name(),
            "bisect"
        );
        assert_eq!(
            partitioning_operator_from_config(PartitionOperatorKind::CheaperFirstDivide, &b)
                .name(),
            "cheaper_first_divide"
        );
    }
}
