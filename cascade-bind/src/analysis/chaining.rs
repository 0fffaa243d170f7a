//! Tracks which operations may execute combinationally in one clock step.
use cascade_ir::{DependenceGraph, IndexRef, OpIdx};
use cascade_utils::DisjointSetForest;

/// Per-function record of committed chaining decisions.
///
/// Each operation owns two forest slots: an *input side* (`2 * id`) and an
/// *output side* (`2 * id + 1`). The two partitions are independent; merging
/// classes in one never merges anything in the other. An operation pair is
/// chainable when one's output class coincides with the other's input class,
/// which the external scheduler establishes by committing decisions through
/// [`commit_chain_in`] / [`commit_chain_out`] as it walks the schedule.
///
/// Keeping the sides separate (instead of a single "same cycle" partition)
/// preserves the direction of each chain: `A` feeding `B` combinationally is
/// distinct from `A` and `B` merely sharing a clock step, and RTL emission
/// routes signals differently in the two cases.
///
/// Committed decisions are never undone; the partitions only ever grow.
/// Queries take `&mut self` because the underlying forest compresses paths,
/// but they never change the partition itself.
///
/// An analyzer instance is tied to the dependence graph it was constructed
/// for. Querying it with operations from a different function is a caller
/// bug that is not runtime-detected.
///
/// [`commit_chain_in`]: ChainingAnalyzer::commit_chain_in
/// [`commit_chain_out`]: ChainingAnalyzer::commit_chain_out
#[derive(Clone, Debug)]
pub struct ChainingAnalyzer {
    sets: DisjointSetForest,
    ops: usize,
}

impl ChainingAnalyzer {
    /// Creates an analyzer for a function with `ops` operations, with every
    /// input and output slot registered as a singleton.
    pub fn with_capacity(ops: usize) -> Self {
        let mut sets = DisjointSetForest::with_capacity(2 * ops);
        if ops > 0 {
            sets.make_set(2 * ops - 1);
        }
        ChainingAnalyzer { sets, ops }
    }

    /// Number of operations this analyzer covers.
    pub fn len(&self) -> usize {
        self.ops
    }

    pub fn is_empty(&self) -> bool {
        self.ops == 0
    }

    fn in_slot(op: OpIdx) -> usize {
        2 * op.index()
    }

    fn out_slot(op: OpIdx) -> usize {
        2 * op.index() + 1
    }

    /// Canonical representative of `op`'s input-side class.
    pub fn representative_in(&mut self, op: OpIdx) -> usize {
        self.sets.find(Self::in_slot(op))
    }

    /// Canonical representative of `op`'s output-side class.
    pub fn representative_out(&mut self, op: OpIdx) -> usize {
        self.sets.find(Self::out_slot(op))
    }

    /// True iff either operation's output class already coincides with the
    /// other's input class.
    ///
    /// The result is deliberately direction-ambiguous: it reports that *a*
    /// chain exists between the two, not which of them feeds the other.
    /// Callers that care about direction must re-derive it from the
    /// dependence graph.
    pub fn may_chain(&mut self, a: OpIdx, b: OpIdx) -> bool {
        self.sets.same_set(Self::out_slot(a), Self::in_slot(b))
            || self.sets.same_set(Self::out_slot(b), Self::in_slot(a))
    }

    /// Records that `producer`'s result directly feeds `op` combinationally
    /// in the same clock step. Idempotent.
    pub fn commit_chain_in(&mut self, op: OpIdx, producer: OpIdx) {
        self.sets.union(Self::in_slot(op), Self::out_slot(producer));
    }

    /// Records that `op`'s result directly feeds `consumer` combinationally
    /// in the same clock step. Idempotent.
    pub fn commit_chain_out(&mut self, op: OpIdx, consumer: OpIdx) {
        self.sets.union(Self::out_slot(op), Self::in_slot(consumer));
    }

    /// True iff `op` participates in any committed chain, on either side.
    /// Operations that never chain keep their own output register.
    pub fn is_chained(&mut self, op: OpIdx) -> bool {
        self.sets.class_size(Self::in_slot(op)) > 1
            || self.sets.class_size(Self::out_slot(op)) > 1
    }

    /// Number of slots merged into `op`'s input-side class.
    pub fn in_class_size(&mut self, op: OpIdx) -> usize {
        self.sets.class_size(Self::in_slot(op))
    }

    /// Number of slots merged into `op`'s output-side class.
    pub fn out_class_size(&mut self, op: OpIdx) -> usize {
        self.sets.class_size(Self::out_slot(op))
    }
}

impl From<&DependenceGraph> for ChainingAnalyzer {
    fn from(graph: &DependenceGraph) -> Self {
        ChainingAnalyzer::with_capacity(graph.len())
    }
}

#[cfg(test)]
mod tests {
    use super::ChainingAnalyzer;
    use cascade_ir::OpIdx;

    fn op(i: usize) -> OpIdx {
        OpIdx::from(i)
    }

    #[test]
    fn fresh_analyzer_has_no_chains() {
        let mut chains = ChainingAnalyzer::with_capacity(3);
        assert!(!chains.may_chain(op(0), op(1)));
        assert!(!chains.may_chain(op(1), op(0)));
        assert!(!chains.is_chained(op(0)));
    }

    #[test]
    fn commit_makes_both_query_directions_true() {
        let mut chains = ChainingAnalyzer::with_capacity(3);
        chains.commit_chain_in(op(1), op(0));
        // `may_chain` is symmetric by design
        assert!(chains.may_chain(op(0), op(1)));
        assert!(chains.may_chain(op(1), op(0)));
        assert!(chains.is_chained(op(0)));
        assert!(chains.is_chained(op(1)));
        assert!(!chains.is_chained(op(2)));
    }

    #[test]
    fn chaining_is_not_transitive_across_a_chain() {
        // 0 -> 1 -> 2, both edges committed
        let mut chains = ChainingAnalyzer::with_capacity(3);
        chains.commit_chain_in(op(1), op(0));
        chains.commit_chain_in(op(2), op(1));
        assert!(chains.may_chain(op(0), op(1)));
        assert!(chains.may_chain(op(1), op(2)));
        // operation 0's output class and operation 2's input class were
        // never merged: an operation's input and output sides are
        // independent partitions.
        assert!(!chains.may_chain(op(0), op(2)));
        // an explicit commit closes the chain
        chains.commit_chain_in(op(2), op(0));
        assert!(chains.may_chain(op(0), op(2)));
    }

    #[test]
    fn commits_survive_unrelated_commits() {
        let mut chains = ChainingAnalyzer::with_capacity(8);
        chains.commit_chain_in(op(1), op(0));
        for i in 3..8 {
            chains.commit_chain_in(op(i), op(2));
        }
        assert!(chains.may_chain(op(0), op(1)));
    }

    #[test]
    fn commit_directions_are_equivalent() {
        let mut one = ChainingAnalyzer::with_capacity(2);
        let mut other = ChainingAnalyzer::with_capacity(2);
        one.commit_chain_in(op(1), op(0));
        other.commit_chain_out(op(0), op(1));
        assert_eq!(
            one.representative_in(op(1)) == one.representative_out(op(0)),
            other.representative_in(op(1)) == other.representative_out(op(0))
        );
        assert!(one.may_chain(op(0), op(1)) && other.may_chain(op(0), op(1)));
    }

    #[test]
    fn representatives_agree_within_a_class() {
        let mut chains = ChainingAnalyzer::with_capacity(3);
        chains.commit_chain_in(op(2), op(0));
        chains.commit_chain_in(op(2), op(1));
        // both producers' output slots merged into the consumer's input class
        assert_eq!(
            chains.representative_out(op(0)),
            chains.representative_out(op(1))
        );
        assert_eq!(
            chains.representative_out(op(0)),
            chains.representative_in(op(2))
        );
        assert_eq!(chains.in_class_size(op(2)), 3);
        assert_eq!(chains.out_class_size(op(2)), 1);
    }
}
