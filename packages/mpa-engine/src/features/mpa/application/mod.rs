/*
 * Multi-Property Application Layer
 */

mod analysis_factory;
mod multi_property_analysis;

pub use analysis_factory::{ComponentBuilder, CompositeAnalysisFactory};
pub use multi_property_analysis::MultiPropertyAnalysis;
