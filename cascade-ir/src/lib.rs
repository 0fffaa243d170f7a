//! Dependence-graph representation consumed by the Cascade synthesis passes.
//!
//! The front end lowers each function body into a [`DependenceGraph`]:
//! operations carry a dense identifier, a resource class, and the control
//! state they are scheduled in; edges carry a dependence kind and a
//! scheduling distance in clock steps. The chaining analyzer and the
//! resource binder only ever read this representation.

mod graph;
mod idx;
mod resource;

pub use graph::{Dependence, DependenceGraph, EdgeKind, Operation};
pub use idx::{IndexRef, OpIdx, StateIdx, UnitIdx};
pub use resource::ResourceClass;
