/*
 * Partitioning
 *
 * An ordered list of non-empty property batches, the budgeting they run
 * under, and the status that tells the partitioning operator which step
 * produced it.
 *
 * Invariant: a partitioning with more than one batch is only valid if every
 * batch size has a CPU or wall-time limit, otherwise the first batch could
 * run forever and starve the rest.
 */

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::features::mpa::domain::PropertyStats;
use crate::features::mpa::ports::{PartitionBudgeting, PropertyBudgeting};
use crate::shared::models::{difference, format_set, Property, PropertySet};

/// Which step of the partitioning strategy produced a partitioning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartitioningStatus {
    /// Nothing partitioned yet
    None,
    /// No further useful split
    Break,
    AllInOne,
    OneForEach,
    CheaperFirstBisect,
    MorePartitions,
}

impl fmt::Display for PartitioningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PartitioningStatus::None => "none",
            PartitioningStatus::Break => "break",
            PartitioningStatus::AllInOne => "all_in_one",
            PartitioningStatus::OneForEach => "one_for_each",
            PartitioningStatus::CheaperFirstBisect => "cheaper_first_bisect",
            PartitioningStatus::MorePartitions => "more_partitions",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone)]
pub struct Partitioning {
    partitions: Vec<PropertySet>,
    status: PartitioningStatus,
    partition_budgeting: Arc<dyn PartitionBudgeting>,
    property_budgeting: Arc<dyn PropertyBudgeting>,
}

impl Partitioning {
    /// Empty batches are dropped.
    pub fn new(
        status: PartitioningStatus,
        partitions: Vec<PropertySet>,
        partition_budgeting: Arc<dyn PartitionBudgeting>,
        property_budgeting: Arc<dyn PropertyBudgeting>,
    ) -> Self {
        Self {
            partitions: partitions.into_iter().filter(|p| !p.is_empty()).collect(),
            status,
            partition_budgeting,
            property_budgeting,
        }
    }

    /// The partitioning before the first run
    pub fn none() -> Self {
        Self::new(
            PartitioningStatus::None,
            Vec::new(),
            Arc::new(Unbudgeted),
            Arc::new(Unbudgeted),
        )
    }

    /// No further partitions, with the budgeting of `self`
    pub fn to_break(&self) -> Self {
        Self {
            partitions: Vec::new(),
            status: PartitioningStatus::Break,
            partition_budgeting: self.partition_budgeting.clone(),
            property_budgeting: self.property_budgeting.clone(),
        }
    }

    pub fn partitions(&self) -> &[PropertySet] {
        &self.partitions
    }

    pub fn status(&self) -> PartitioningStatus {
        self.status
    }

    pub fn is_empty(&self) -> bool {
        self.partitions.is_empty()
    }

    pub fn partition_count(&self) -> usize {
        self.partitions.len()
    }

    pub fn first_partition(&self) -> Option<&PropertySet> {
        self.partitions.first()
    }

    /// Remaining batches once the first one has been scheduled
    pub fn without_first(&self) -> Self {
        Self {
            partitions: self.partitions.iter().skip(1).cloned().collect(),
            ..self.clone()
        }
    }

    /// Same partitioning with `properties` removed from every batch
    pub fn subtract(&self, properties: &PropertySet) -> Self {
        Self::new(
            self.status,
            self.partitions
                .iter()
                .map(|p| difference(p, properties))
                .collect(),
            self.partition_budgeting.clone(),
            self.property_budgeting.clone(),
        )
    }

    /// Union of all batches
    pub fn properties(&self) -> PropertySet {
        self.partitions.iter().flatten().cloned().collect()
    }

    pub fn partition_budgeting(&self) -> &Arc<dyn PartitionBudgeting> {
        &self.partition_budgeting
    }

    pub fn property_budgeting(&self) -> &Arc<dyn PropertyBudgeting> {
        &self.property_budgeting
    }

    /// Batch sizes lacking a time limit, if this partitioning has more
    /// than one batch
    pub fn unlimited_partition_sizes(&self) -> Vec<usize> {
        if self.partitions.len() <= 1 {
            return Vec::new();
        }
        let mut sizes: Vec<usize> = self
            .partitions
            .iter()
            .map(PropertySet::len)
            .filter(|size| !self.partition_budgeting.is_limited(*size))
            .collect();
        sizes.sort_unstable();
        sizes.dedup();
        sizes
    }

    /// True if the multi-batch time-limit invariant holds
    pub fn has_required_limits(&self) -> bool {
        self.unlimited_partition_sizes().is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PropertySet> {
        self.partitions.iter()
    }
}

impl<'a> IntoIterator for &'a Partitioning {
    type Item = &'a PropertySet;
    type IntoIter = std::slice::Iter<'a, PropertySet>;

    fn into_iter(self) -> Self::IntoIter {
        self.partitions.iter()
    }
}

/// Budgeting of the partitioning before the first run: no limits at all
#[derive(Debug, Clone, Copy)]
struct Unbudgeted;

impl PartitionBudgeting for Unbudgeted {
    fn wall_time_limit(&self, _property_count: usize) -> Option<Duration> {
        None
    }

    fn cpu_time_limit(&self, _property_count: usize) -> Option<Duration> {
        None
    }

    fn budget_times_two(&self) -> Arc<dyn PartitionBudgeting> {
        Arc::new(Unbudgeted)
    }
}

impl PropertyBudgeting for Unbudgeted {
    fn is_exhausted(&self, _property: &Property, _stats: &PropertyStats) -> bool {
        false
    }
}

impl fmt::Display for Partitioning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [", self.status)?;
        for (i, partition) in self.partitions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            f.write_str(&format_set(partition))?;
        }
        f.write_str("]")
    }
}
