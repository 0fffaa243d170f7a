//! Assigns operations to physical functional units, class by class.
use crate::analysis::{BipartiteMatcher, CostMatrix};
use cascade_ir::{DependenceGraph, IndexRef, OpIdx, ResourceClass, UnitIdx};
use cascade_utils::{CascadeResult, Error};
use itertools::Itertools;
use std::collections::HashMap;

/// Interconnect cost of placing operations on candidate units, supplied by
/// the synthesis driver.
///
/// Costs must be scaled below [`CostMatrix::MAX_COST`]; the binder rejects
/// a model that exceeds the ceiling. [`max_row`] reports the most expensive
/// candidate for an operation, which cost-scaling callers use to normalize
/// their models.
///
/// [`max_row`]: CostModel::max_row
pub trait CostModel {
    /// Cost of assigning `op` to `unit` within the operation's class pool.
    fn cost(&self, op: OpIdx, unit: UnitIdx) -> u64;

    /// Maximum cost over all candidate units for `op`.
    fn max_row(&self, op: OpIdx) -> u64;
}

/// The physical functional-unit instances available per resource class.
#[derive(Clone, Debug, Default)]
pub struct ResourcePool {
    units: HashMap<ResourceClass, usize>,
}

impl ResourcePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares `count` instances of `class`, replacing any earlier count.
    pub fn set_units(&mut self, class: ResourceClass, count: usize) {
        self.units.insert(class, count);
    }

    /// Number of instances available for `class`. Classes never declared
    /// have zero units.
    pub fn units(&self, class: ResourceClass) -> usize {
        self.units.get(&class).copied().unwrap_or(0)
    }
}

impl FromIterator<(ResourceClass, usize)> for ResourcePool {
    fn from_iter<I: IntoIterator<Item = (ResourceClass, usize)>>(
        iter: I,
    ) -> Self {
        ResourcePool {
            units: iter.into_iter().collect(),
        }
    }
}

/// Where one operation ended up: its class and the unit instance within
/// that class's pool.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Placement {
    pub class: ResourceClass,
    pub unit: UnitIdx,
}

/// Binding outcome for one resource-class group.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct GroupBinding {
    pub class: ResourceClass,
    /// Operations bound in this group, in identifier order.
    pub ops: Vec<OpIdx>,
    /// Units the pool offered for this class.
    pub units_available: usize,
    /// Total matching cost of the group.
    pub cost: u64,
}

/// The function-wide operation→unit mapping produced by a successful bind.
/// Read-only once produced; RTL emission consumes it as-is.
#[derive(Clone, Debug, Default)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Assignment {
    placements: HashMap<OpIdx, Placement>,
    groups: Vec<GroupBinding>,
    total_cost: u64,
}

impl Assignment {
    /// The placement of `op`, if it was bound.
    pub fn unit_of(&self, op: OpIdx) -> Option<Placement> {
        self.placements.get(&op).copied()
    }

    /// Number of bound operations.
    pub fn len(&self) -> usize {
        self.placements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.placements.is_empty()
    }

    /// Iterator over all `(operation, placement)` pairs, unordered.
    pub fn iter(&self) -> impl Iterator<Item = (OpIdx, Placement)> + '_ {
        self.placements.iter().map(|(&op, &placement)| (op, placement))
    }

    /// Per-class binding summaries, ordered by class name.
    pub fn groups(&self) -> &[GroupBinding] {
        &self.groups
    }

    /// Sum of all groups' matching costs.
    pub fn total_cost(&self) -> u64 {
        self.total_cost
    }
}

/// Binds every operation of a function to a physical unit at minimum total
/// interconnect cost.
///
/// Operations are grouped by resource class. Each group of `p` operations
/// over `q` units becomes a `q x q` cost matrix — the `q - p` dummy rows
/// cost nothing on every unit, so they absorb leftover units without
/// distorting the real placements — and is solved exactly by
/// [`BipartiteMatcher`]. Dummy assignments are discarded from the result.
///
/// A group that cannot be placed (`p > q`, including `q == 0`) aborts the
/// whole function's bind with [`Error::ResourceExhausted`]: a partial
/// assignment must never reach RTL emission.
#[derive(Debug, Default)]
pub struct ResourceBinder {
    matcher: BipartiteMatcher,
}

impl ResourceBinder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes the operation→unit assignment for one function.
    ///
    /// Groups are processed in class-name order, so the outcome (and which
    /// exhausted class is reported first) is deterministic.
    pub fn bind<M: CostModel>(
        &mut self,
        graph: &DependenceGraph,
        pool: &ResourcePool,
        model: &M,
    ) -> CascadeResult<Assignment> {
        let groups = graph
            .operations_by_class()
            .into_iter()
            .sorted_by_key(|&(class, _)| class.as_str());

        let mut assignment = Assignment::default();
        for (class, ops) in groups {
            let placed = self.bind_group(class, &ops, pool, model)?;
            let cost = placed.cost;
            for (i, &op) in ops.iter().enumerate() {
                assignment.placements.insert(
                    op,
                    Placement {
                        class,
                        unit: placed.units[i],
                    },
                );
            }
            assignment.groups.push(GroupBinding {
                class,
                ops,
                units_available: pool.units(class),
                cost,
            });
            assignment.total_cost += cost;
        }
        Ok(assignment)
    }

    /// Places one class group, returning the unit chosen for each operation
    /// (parallel to `ops`) and the group's matching cost.
    fn bind_group<M: CostModel>(
        &mut self,
        class: ResourceClass,
        ops: &[OpIdx],
        pool: &ResourcePool,
        model: &M,
    ) -> CascadeResult<PlacedGroup> {
        let p = ops.len();
        let q = pool.units(class);
        if p > q {
            return Err(Error::resource_exhausted(
                class,
                ops.iter().map(|op| op.index()).collect(),
                q,
            ));
        }

        if q > p {
            log::debug!(
                "padding `{}` group: {} operations over {} units",
                class,
                p,
                q
            );
        }
        let costs = CostMatrix::from_fn(q, |i, j| {
            if i < p {
                let c = model.cost(ops[i], UnitIdx::new(j));
                debug_assert!(
                    c <= model.max_row(ops[i]),
                    "cost model reported a cost above its own max_row"
                );
                c
            } else {
                // dummy row
                0
            }
        })?;

        let matching = self.matcher.solve(&costs);
        // Dummy rows contribute nothing, so the real placements carry the
        // whole cost.
        let units = (0..p)
            .map(|i| UnitIdx::new(matching.col_of(i)))
            .collect_vec();
        log::info!(
            "bound {} `{}` operations onto {} units, cost {}",
            p,
            class,
            q,
            matching.total_cost()
        );
        Ok(PlacedGroup {
            units,
            cost: matching.total_cost(),
        })
    }
}

/// Result of matching one group: the unit per operation plus the cost.
struct PlacedGroup {
    units: Vec<UnitIdx>,
    cost: u64,
}
