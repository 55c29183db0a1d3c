//! Statistics sink that writes the final summary to the tracing log

use tracing::{info, warn};

use crate::features::mpa::domain::{DecompositionStatistics, PropertySummary};
use crate::features::mpa::ports::StatisticsSink;
use crate::shared::models::format_set;

#[derive(Debug, Default, Clone, Copy)]
pub struct TracingStatisticsSink;

impl StatisticsSink for TracingStatisticsSink {
    fn report(&self, summary: &PropertySummary, statistics: &DecompositionStatistics) {
        info!(
            verdict = %summary.verdict(),
            iterations = statistics.iterations,
            restarts = statistics.restarts,
            partition_adjustments = statistics.partition_adjustments,
            partition_exhaustions = statistics.partition_exhaustions,
            analysis_time_ms = statistics.pure_analysis_time.as_millis() as u64,
            "Multi-property analysis statistics"
        );
        info!(violated = %format_set(summary.violated()), "Violated properties");
        info!(satisfied = %format_set(summary.satisfied()), "Satisfied properties");
        if !summary.unknown().is_empty() {
            warn!(unknown = %format_set(summary.unknown()), "Properties without verdict");
        }
        if let Ok(json) = serde_json::to_string(statistics) {
            tracing::debug!(statistics = %json, "Decomposition statistics");
        }
    }
}
