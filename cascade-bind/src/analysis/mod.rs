//! Analyses backing the chaining and binding decisions.

mod chaining;
mod matching;

pub use chaining::ChainingAnalyzer;
pub use matching::{BipartiteMatcher, CostMatrix, Matching};
