//! An array-backed disjoint-set forest (union-find).

/// A partition of dense integer elements into disjoint sets, with
/// path-compressing `find` and union-by-rank `union`. Both operations are
/// amortized inverse-Ackermann, i.e. effectively constant, over the life of
/// the forest.
///
/// Elements are dense `usize` ids registered with [`make_set`]. The chaining
/// analyzer registers two slots per operation (input side and output side),
/// so a forest over `n` operations holds `2 * n` elements.
///
/// # Panics
/// `find`, `union`, `same_set`, and `class_size` panic when handed an element
/// that was never registered. That is a caller bug, not a recoverable
/// condition; client code must register every slot before first use.
///
/// [`make_set`]: DisjointSetForest::make_set
#[derive(Clone, Debug, Default)]
pub struct DisjointSetForest {
    /// Parent pointer per element. A root points at itself.
    parent: Vec<usize>,
    /// Upper bound on the height of the tree rooted at each element.
    /// Only meaningful for roots.
    rank: Vec<u32>,
    /// Number of elements in the set rooted at each element.
    /// Only meaningful for roots.
    size: Vec<u32>,
}

impl DisjointSetForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a forest with room reserved for `n` elements. The elements
    /// still need to be registered with [`make_set`](Self::make_set).
    pub fn with_capacity(n: usize) -> Self {
        DisjointSetForest {
            parent: Vec::with_capacity(n),
            rank: Vec::with_capacity(n),
            size: Vec::with_capacity(n),
        }
    }

    /// Number of registered elements.
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Registers `element` as a singleton set. Also registers any smaller,
    /// not-yet-seen ids so that the element space stays dense. Registering
    /// an element twice leaves the partition untouched.
    pub fn make_set(&mut self, element: usize) {
        if element < self.parent.len() {
            return;
        }
        for e in self.parent.len()..=element {
            self.parent.push(e);
            self.rank.push(0);
            self.size.push(1);
        }
    }

    /// Returns the canonical representative of the set containing `element`,
    /// compressing the walked path onto the root.
    pub fn find(&mut self, element: usize) -> usize {
        assert!(
            element < self.parent.len(),
            "element {} queried before make_set",
            element
        );
        // First pass: locate the root.
        let mut root = element;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        // Second pass: repoint the path at the root.
        let mut cur = element;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    /// Merges the sets containing `a` and `b`. Idempotent when the two are
    /// already in the same set. Callers that need to know whether a merge
    /// happened should compare representatives before and after.
    pub fn union(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        if ra == rb {
            return;
        }
        // Attach the shallower tree under the deeper one.
        let (child, root) = if self.rank[ra] < self.rank[rb] {
            (ra, rb)
        } else {
            (rb, ra)
        };
        self.parent[child] = root;
        self.size[root] += self.size[child];
        if self.rank[root] == self.rank[child] {
            self.rank[root] += 1;
        }
    }

    /// True iff `a` and `b` are currently in the same set.
    pub fn same_set(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    /// Number of elements in the set containing `element`.
    pub fn class_size(&mut self, element: usize) -> usize {
        let root = self.find(element);
        self.size[root] as usize
    }
}
