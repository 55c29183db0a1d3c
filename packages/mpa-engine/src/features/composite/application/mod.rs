/*
 * Composite Application Layer
 */

mod analysis;

pub use analysis::CompositeAnalysis;
