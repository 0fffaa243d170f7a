//! Minimum-cost perfect matching over a square cost matrix.
use cascade_utils::{CascadeResult, Error};

/// Matched-edge sentinel used in the solver's internal tables.
const UNMATCHED: usize = usize::MAX;

/// A square matrix of non-negative assignment costs, row-major.
///
/// Squareness and the cost ceiling are enforced at construction, so a
/// `CostMatrix` handed to the solver is always well formed. Costs are
/// bounded by [`MAX_COST`] so the solver's dual potentials cannot overflow;
/// negative costs are unrepresentable.
///
/// [`MAX_COST`]: CostMatrix::MAX_COST
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CostMatrix {
    size: usize,
    cells: Vec<u64>,
}

impl CostMatrix {
    /// Largest admissible cell cost. The cost model must scale its outputs
    /// below this ceiling.
    pub const MAX_COST: u64 = 1 << 40;

    /// Weight for an (operation, unit) pair the cost model wants the solver
    /// to avoid. The solver only picks such a cell when no cheaper perfect
    /// matching exists at all.
    pub const FORBIDDEN: u64 = Self::MAX_COST;

    /// Builds an `n x n` matrix by evaluating `cost(row, col)` per cell.
    pub fn from_fn(
        n: usize,
        mut cost: impl FnMut(usize, usize) -> u64,
    ) -> CascadeResult<Self> {
        let mut cells = Vec::with_capacity(n * n);
        for row in 0..n {
            for col in 0..n {
                let c = cost(row, col);
                if c > Self::MAX_COST {
                    return Err(Error::malformed_matrix(format!(
                        "cost {} at ({}, {}) exceeds the ceiling {}",
                        c,
                        row,
                        col,
                        Self::MAX_COST
                    )));
                }
                cells.push(c);
            }
        }
        Ok(CostMatrix { size: n, cells })
    }

    /// Builds a matrix from explicit rows, which must form a square.
    pub fn from_rows(rows: Vec<Vec<u64>>) -> CascadeResult<Self> {
        let n = rows.len();
        if let Some(row) = rows.iter().find(|r| r.len() != n) {
            return Err(Error::malformed_matrix(format!(
                "expected {} columns per row, found a row with {}",
                n,
                row.len()
            )));
        }
        Self::from_fn(n, |i, j| rows[i][j])
    }

    /// Side length of the matrix.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Cost of assigning `row` to `col`.
    pub fn cost(&self, row: usize, col: usize) -> u64 {
        self.cells[row * self.size + col]
    }
}

/// A perfect matching produced by [`BipartiteMatcher::solve`]: a bijection
/// from rows to columns and its total cost.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serialize", derive(serde::Serialize))]
pub struct Matching {
    row_to_col: Vec<usize>,
    total_cost: u64,
}

impl Matching {
    /// The column matched to `row`.
    pub fn col_of(&self, row: usize) -> usize {
        self.row_to_col[row]
    }

    /// Iterator over `(row, col)` pairs.
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.row_to_col.iter().copied().enumerate()
    }

    pub fn len(&self) -> usize {
        self.row_to_col.len()
    }

    pub fn is_empty(&self) -> bool {
        self.row_to_col.is_empty()
    }

    /// Sum of the matched cells' costs. By LP duality this equals the sum
    /// of the solver's final potentials and is provably minimal.
    pub fn total_cost(&self) -> u64 {
        self.total_cost
    }
}

/// Exact minimum-cost perfect matching via the Kuhn–Munkres (Hungarian)
/// algorithm, O(n³) in the matrix size.
///
/// The solver maintains dual potentials `lx` (rows) and `ly` (columns) with
/// the feasibility invariant `lx[i] + ly[j] <= cost(i, j)` for every cell
/// and equality on matched cells. Each of the `n` rounds grows an
/// alternating tree of *tight* edges from one unmatched row; when the tree
/// cannot reach an unmatched column it relabels the potentials by the
/// minimum slack, creating a new tight edge without breaking feasibility,
/// and resumes. Reaching an unmatched column augments the matching along
/// the discovered path.
///
/// The struct itself is just the solver's scratch space (slack tables,
/// tree membership, potentials), retained between calls so that binding
/// many resource groups in a row reuses the allocations. It holds no state
/// that outlives a `solve` call.
#[derive(Clone, Debug, Default)]
pub struct BipartiteMatcher {
    /// Per-row dual potential.
    lx: Vec<i64>,
    /// Per-column dual potential.
    ly: Vec<i64>,
    row_to_col: Vec<usize>,
    col_to_row: Vec<usize>,
    /// Minimum reduced cost from the current tree to each column.
    slack: Vec<i64>,
    /// Tree row realizing `slack` for each column.
    slack_from: Vec<usize>,
    in_tree_row: Vec<bool>,
    in_tree_col: Vec<bool>,
}

impl BipartiteMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Computes a minimum-cost perfect matching for `costs`.
    pub fn solve(&mut self, costs: &CostMatrix) -> Matching {
        let n = costs.size();
        self.reset(n, costs);
        for root in 0..n {
            self.augment_from(root, costs);
        }
        let total_cost = self
            .row_to_col
            .iter()
            .enumerate()
            .map(|(row, &col)| costs.cost(row, col))
            .sum();
        Matching {
            row_to_col: self.row_to_col.clone(),
            total_cost,
        }
    }

    fn reset(&mut self, n: usize, costs: &CostMatrix) {
        // Start each row potential at its cheapest cell: the tightest
        // feasible duals, which minimizes the relabeling rounds needed.
        self.lx.clear();
        self.lx.extend((0..n).map(|row| {
            (0..n).map(|col| costs.cost(row, col) as i64).min().unwrap_or(0)
        }));
        self.ly.clear();
        self.ly.resize(n, 0);
        self.row_to_col.clear();
        self.row_to_col.resize(n, UNMATCHED);
        self.col_to_row.clear();
        self.col_to_row.resize(n, UNMATCHED);
        self.slack.resize(n, 0);
        self.slack_from.resize(n, 0);
        self.in_tree_row.resize(n, false);
        self.in_tree_col.resize(n, false);
    }

    /// Grows an alternating tree from the unmatched row `root` until it
    /// reaches an unmatched column, then augments the matching by one edge.
    fn augment_from(&mut self, root: usize, costs: &CostMatrix) {
        let n = costs.size();
        self.in_tree_row[..n].fill(false);
        self.in_tree_col[..n].fill(false);
        self.in_tree_row[root] = true;
        for col in 0..n {
            self.slack[col] =
                costs.cost(root, col) as i64 - self.lx[root] - self.ly[col];
            self.slack_from[col] = root;
        }

        let end_col = loop {
            // Tightest column not yet in the tree.
            let (col, delta) = (0..n)
                .filter(|&col| !self.in_tree_col[col])
                .map(|col| (col, self.slack[col]))
                .min_by_key(|&(_, slack)| slack)
                .expect("alternating tree exhausted all columns");

            if delta > 0 {
                // No tight edge leaves the tree: shift the potentials by the
                // minimum slack. Tree-internal and matched edges stay tight,
                // and at least `col` becomes tight.
                for row in 0..n {
                    if self.in_tree_row[row] {
                        self.lx[row] += delta;
                    }
                }
                for col in 0..n {
                    if self.in_tree_col[col] {
                        self.ly[col] -= delta;
                    } else {
                        self.slack[col] -= delta;
                    }
                }
            }

            self.in_tree_col[col] = true;
            match self.col_to_row[col] {
                UNMATCHED => break col,
                row => {
                    // Column is matched: pull its row into the tree and
                    // relax the slacks it offers.
                    self.in_tree_row[row] = true;
                    for other in 0..n {
                        if self.in_tree_col[other] {
                            continue;
                        }
                        let reduced = costs.cost(row, other) as i64
                            - self.lx[row]
                            - self.ly[other];
                        if reduced < self.slack[other] {
                            self.slack[other] = reduced;
                            self.slack_from[other] = row;
                        }
                    }
                }
            }
        };

        // Flip matched/unmatched edges along the path back to the root.
        let mut col = end_col;
        loop {
            let row = self.slack_from[col];
            let prev = self.row_to_col[row];
            self.row_to_col[row] = col;
            self.col_to_row[col] = row;
            if prev == UNMATCHED {
                break;
            }
            col = prev;
        }
    }
}
