//! The per-function dependence graph.
use crate::{IndexRef, OpIdx, ResourceClass, StateIdx};
use cascade_utils::{CascadeResult, Error};
use itertools::Itertools;
use petgraph::{
    algo,
    graph::{DiGraph, NodeIndex},
    visit::EdgeRef,
    Direction::{Incoming, Outgoing},
};
use std::collections::HashMap;

/// The kind of a dependence between two operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub enum EdgeKind {
    /// The producer's result is read by the consumer.
    Data,
    /// The consumer overwrites a location the producer reads.
    Anti,
    /// The consumer's execution is predicated on the producer.
    Control,
}

/// Payload of a dependence edge: its kind and the scheduling distance in
/// clock steps between producer and consumer. Distance 0 means both are
/// scheduled in the same step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Dependence {
    pub kind: EdgeKind,
    pub distance: u32,
}

impl Dependence {
    pub fn new(kind: EdgeKind, distance: u32) -> Self {
        Dependence { kind, distance }
    }

    /// Zero-distance data dependence, i.e. the producer's result flows to
    /// the consumer within one clock step.
    pub fn data(distance: u32) -> Self {
        Dependence::new(EdgeKind::Data, distance)
    }

    /// True iff this edge may be realized combinationally: a data
    /// dependence with zero scheduling distance.
    pub fn is_combinational(&self) -> bool {
        self.kind == EdgeKind::Data && self.distance == 0
    }
}

/// One scheduled unit of work: an arithmetic operation, a memory access, a
/// call. Immutable once inserted into a [`DependenceGraph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Operation {
    /// Dense 0-based identifier, stable for the life of the graph.
    pub idx: OpIdx,
    /// The functional-unit flavor this operation executes on.
    pub class: ResourceClass,
    /// The controller state this operation is scheduled in.
    pub state: StateIdx,
}

impl Operation {
    pub fn new(idx: OpIdx, class: ResourceClass, state: StateIdx) -> Self {
        Operation { idx, class, state }
    }
}

/// Directed graph of [`Operation`]s and [`Dependence`] edges for one
/// synthesized function.
///
/// The graph is append-only: the front end registers every operation in
/// identifier order and then adds edges. Downstream passes (chaining
/// analysis, resource binding) only read it.
#[derive(Debug, Default)]
pub struct DependenceGraph {
    /// Mapping from operation id to the underlying graph node.
    index_map: HashMap<OpIdx, NodeIndex>,
    graph: DiGraph<Operation, Dependence>,
}

impl DependenceGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(ops: usize, edges: usize) -> Self {
        DependenceGraph {
            index_map: HashMap::with_capacity(ops),
            graph: DiGraph::with_capacity(ops, edges),
        }
    }

    /// Number of operations in the graph.
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Registers `op`. Operation ids are dense and must arrive in order;
    /// anything else (including re-registering an id) is malformed.
    pub fn add_operation(&mut self, op: Operation) -> CascadeResult<OpIdx> {
        if op.idx.index() != self.len() {
            return Err(Error::malformed_graph(format!(
                "operation ids must be dense and registered in order: \
                 got {}, expected {}",
                op.idx,
                self.len()
            )));
        }
        let node = self.graph.add_node(op);
        self.index_map.insert(op.idx, node);
        Ok(op.idx)
    }

    /// Adds a dependence edge `src -> dst`. Both endpoints must already be
    /// registered.
    pub fn add_dependence(
        &mut self,
        src: OpIdx,
        dst: OpIdx,
        dep: Dependence,
    ) -> CascadeResult<()> {
        let (&s, &d) = match (self.index_map.get(&src), self.index_map.get(&dst))
        {
            (Some(s), Some(d)) => (s, d),
            _ => {
                return Err(Error::malformed_graph(format!(
                    "dangling dependence edge {} -> {}",
                    src, dst
                )))
            }
        };
        self.graph.add_edge(s, d, dep);
        Ok(())
    }

    /// The operation registered under `idx`, if any.
    pub fn operation(&self, idx: OpIdx) -> Option<&Operation> {
        self.index_map.get(&idx).map(|&n| &self.graph[n])
    }

    /// Iterator over all operations, in identifier order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.graph.node_weights()
    }

    /// Operations that `op` depends on, with the connecting edges.
    pub fn predecessors(
        &self,
        op: OpIdx,
    ) -> impl Iterator<Item = (&Operation, &Dependence)> {
        self.neighbors(op, Incoming)
    }

    /// Operations that depend on `op`, with the connecting edges.
    pub fn successors(
        &self,
        op: OpIdx,
    ) -> impl Iterator<Item = (&Operation, &Dependence)> {
        self.neighbors(op, Outgoing)
    }

    fn neighbors(
        &self,
        op: OpIdx,
        dir: petgraph::Direction,
    ) -> impl Iterator<Item = (&Operation, &Dependence)> {
        self.index_map
            .get(&op)
            .into_iter()
            .flat_map(move |&n| self.graph.edges_directed(n, dir))
            .map(move |edge| {
                let other = match dir {
                    Outgoing => edge.target(),
                    Incoming => edge.source(),
                };
                (&self.graph[other], edge.weight())
            })
    }

    /// True iff some `src -> dst` edge may be realized combinationally
    /// (data kind, zero scheduling distance).
    pub fn is_chainable_edge(&self, src: OpIdx, dst: OpIdx) -> bool {
        match (self.index_map.get(&src), self.index_map.get(&dst)) {
            (Some(&s), Some(&d)) => self
                .graph
                .edges_connecting(s, d)
                .any(|e| e.weight().is_combinational()),
            _ => false,
        }
    }

    /// True iff the zero-distance data subgraph contains a cycle. A cycle
    /// here means the front end scheduled a combinational loop, which no
    /// chaining decision can realize in hardware.
    pub fn has_combinational_cycle(&self) -> bool {
        let comb = self.graph.filter_map(
            |_, op| Some(op),
            |_, dep| dep.is_combinational().then_some(()),
        );
        algo::is_cyclic_directed(&comb)
    }

    /// Groups operation ids by resource class. Ids within a group are
    /// sorted so that binding is deterministic.
    pub fn operations_by_class(&self) -> HashMap<ResourceClass, Vec<OpIdx>> {
        let mut groups: HashMap<ResourceClass, Vec<OpIdx>> = self
            .operations()
            .map(|op| (op.class, op.idx))
            .into_group_map();
        for ops in groups.values_mut() {
            ops.sort_unstable();
        }
        groups
    }
}
