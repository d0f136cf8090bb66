//! Partition vertices into ranks from per-vertex invariants.
//!
//! The ranker is invoked once per refinement round over a shrinking set of
//! still-tied vertices, so it keeps its scratch buffers between calls and
//! switches to insertion sort for short ranges.

/// Ranges shorter than this are insertion sorted.
const INSERTION_SORT_THRESHOLD: usize = 20;

/// Assigns ranks to vertices by sorting on (previous rank, invariant).
///
/// Ranks are competition ranks over the `total` participating vertices: a
/// group of tied vertices whose first member sits at sorted position `p`
/// (1-based) gets rank `p`. Before the first call to [`rank`] every
/// participating vertex must have rank 1.
///
/// [`rank`]: InvariantRanker::rank
#[derive(Debug, Clone)]
pub struct InvariantRanker {
    total: usize,
    vs: Vec<usize>,
    ws: Vec<usize>,
}

impl InvariantRanker {
    /// Construct a ranker for a partition over `total` vertices.
    pub fn new(total: usize) -> Self {
        Self {
            total,
            vs: Vec::with_capacity(total),
            ws: Vec::with_capacity(total),
        }
    }

    /// Number of vertices in the partition.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Rank the vertices in `current` and return the number of distinct
    /// ranks over all `total` vertices.
    ///
    /// `ranks` holds the previous rank of every vertex and is updated in
    /// place. Vertices are ordered by previous rank, then by `invariants`,
    /// then by their position in `current`; a vertex ranked apart from
    /// another in an earlier round therefore stays apart. On return `next`
    /// holds the vertices that still share a rank with another vertex, in
    /// sorted order.
    ///
    /// # Panics
    /// If `current` holds more than `total` vertices.
    pub fn rank(
        &mut self,
        current: &[usize],
        next: &mut Vec<usize>,
        invariants: &[u64],
        ranks: &mut [u64],
    ) -> usize {
        let n = current.len();
        assert!(
            n <= self.total,
            "cannot rank {n} vertices with a ranker sized for {}",
            self.total
        );
        next.clear();
        if n == 0 {
            return self.total;
        }

        self.vs.clear();
        self.vs.extend_from_slice(current);
        self.ws.resize(n, 0);
        sort_by(&mut self.vs, &mut self.ws, invariants, ranks);

        // Vertices outside `current` are already unique.
        let mut distinct = self.total - n;

        // Start of the current previous-rank class and of the current group
        // of equal keys, both as positions in `vs`.
        let mut class_start = 0;
        let mut group_start = 0;
        let mut label = 0;
        let mut last = (0, 0);

        for i in 0..n {
            let v = self.vs[i];
            let key = (ranks[v], invariants[v]);
            let opens_group = if i == 0 || key.0 != last.0 {
                class_start = i;
                label = key.0;
                true
            } else if key.1 != last.1 {
                label = key.0 + (i - class_start) as u64;
                true
            } else {
                false
            };

            if opens_group {
                if i - group_start > 1 {
                    next.extend_from_slice(&self.vs[group_start..i]);
                }
                group_start = i;
                distinct += 1;
            }

            ranks[v] = label;
            last = key;
        }
        if n - group_start > 1 {
            next.extend_from_slice(&self.vs[group_start..n]);
        }

        distinct
    }
}

// Previous rank is the primary key, so refinement only ever splits classes.
#[inline]
fn less(a: usize, b: usize, invariants: &[u64], ranks: &[u64]) -> bool {
    ranks[a] < ranks[b] || (ranks[a] == ranks[b] && invariants[a] < invariants[b])
}

/// Stable sort of `vs` by (rank, invariant), using `ws` as scratch space of
/// at least the same length.
fn sort_by(vs: &mut [usize], ws: &mut [usize], invariants: &[u64], ranks: &[u64]) {
    if vs.len() < INSERTION_SORT_THRESHOLD {
        insertion_sort(vs, invariants, ranks);
    } else {
        merge_sort(vs, ws, invariants, ranks);
    }
}

fn insertion_sort(vs: &mut [usize], invariants: &[u64], ranks: &[u64]) {
    for i in 1..vs.len() {
        let mut j = i;
        while j > 0 && less(vs[j], vs[j - 1], invariants, ranks) {
            vs.swap(j, j - 1);
            j -= 1;
        }
    }
}

fn merge_sort(vs: &mut [usize], ws: &mut [usize], invariants: &[u64], ranks: &[u64]) {
    let n = vs.len();
    if n < INSERTION_SORT_THRESHOLD {
        insertion_sort(vs, invariants, ranks);
        return;
    }

    let mid = n / 2;
    {
        let (left, right) = vs.split_at_mut(mid);
        let (wleft, wright) = ws[..n].split_at_mut(mid);
        merge_sort(left, wleft, invariants, ranks);
        merge_sort(right, wright, invariants, ranks);
    }

    // Already in order.
    if !less(vs[mid], vs[mid - 1], invariants, ranks) {
        return;
    }

    ws[..n].copy_from_slice(vs);
    let (mut i, mut j) = (0, mid);
    for slot in vs.iter_mut() {
        if j >= n || (i < mid && !less(ws[j], ws[i], invariants, ranks)) {
            *slot = ws[i];
            i += 1;
        } else {
            *slot = ws[j];
            j += 1;
        }
    }
}
