//! # Chaining analysis and resource binding
//!
//! This crate implements the two datapath decisions Cascade makes after a
//! function body has been scheduled:
//!
//! 1. **Chaining** ([`analysis::ChainingAnalyzer`]): which dependent
//!    operations execute combinationally within the same clock step,
//!    avoiding an intermediate register. The analyzer tracks the scheduler's
//!    decisions in two disjoint-set partitions, one over operation inputs
//!    and one over operation outputs.
//! 2. **Binding** ([`binder::ResourceBinder`]): which physical functional
//!    unit each operation executes on. Operations are grouped by resource
//!    class and each group is placed by an exact minimum-cost bipartite
//!    matching ([`analysis::BipartiteMatcher`]).
//!
//! Both passes run once per synthesized function, single threaded, over the
//! [`cascade_ir::DependenceGraph`] the front end produced. Their outputs
//! (the chaining relation and the operation→unit [`binder::Assignment`])
//! are read-only inputs to RTL emission.

pub mod analysis;
pub mod binder;

pub use analysis::{BipartiteMatcher, ChainingAnalyzer, CostMatrix, Matching};
pub use binder::{
    Assignment, CostModel, GroupBinding, Placement, ResourceBinder,
    ResourcePool,
};
