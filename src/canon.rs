//! Canonical labelling and symmetry classes by iterative refinement.
//!
//! Vertices start out ranked by their basic invariants. Each round replaces
//! the invariant of every still-tied vertex by the product of the primes
//! indexed by its neighbours' ranks and re-ranks the tied vertices. When a
//! round no longer splits any class the ranks are the symmetry classes.
//!
//! Equal ranks do not prove two vertices symmetric, so a canonical labelling
//! cannot simply individualise one member of a tied class. Instead every
//! member of the lowest tied class is individualised in turn, refinement
//! resumes, and the search recurses until every rank is unique. The discrete
//! ranking whose relabelled graph is lexicographically smallest is the
//! labelling. Automorphisms found along the way prune children that lie in
//! an already explored orbit.
//!
//! Terminal hydrogens (see [`terminal_hydrogens`]) take no part in
//! refinement. They are ranked after all other atoms, ordered by the rank of
//! the atom they are attached to.

use bit_set::BitSet;
use tracing::{debug, trace};

use crate::{
    invariants::{basic_invariants, terminal_hydrogens},
    molecule::Molecule,
    ranker::InvariantRanker,
    utils::primes,
};

/// Compute the symmetry classes of the atoms of `mol`. Two atoms share a
/// value iff refinement cannot tell them apart.
pub fn symmetry(mol: &Molecule) -> Vec<u64> {
    let g = mol.adjacency();
    symmetry_of(&g, &basic_invariants(mol, &g), &terminal_hydrogens(mol, &g))
}

/// Compute canonical labels for the atoms of `mol`: a permutation of
/// `1..=atom_count` that does not depend on the input atom order.
///
/// Labels consider atom properties and connectivity, not bond orders.
pub fn label(mol: &Molecule) -> Vec<u64> {
    let g = mol.adjacency();
    label_of(&g, &basic_invariants(mol, &g), &terminal_hydrogens(mol, &g))
}

/// Symmetry classes of the graph `g` starting from caller-supplied round-0
/// `invariants`. Vertices in `hydrogens` are excluded from refinement.
///
/// # Panics
/// If `g` is not a simple, symmetric adjacency, if `invariants` does not have
/// one entry per vertex, or if a vertex in `hydrogens` does not have exactly
/// one neighbour.
pub fn symmetry_of(g: &[Vec<usize>], invariants: &[u64], hydrogens: &BitSet) -> Vec<u64> {
    Canon::new(g, hydrogens).refine(invariants, Target::Symmetry)
}

/// Canonical labels of the graph `g` starting from caller-supplied round-0
/// `invariants`. Vertices in `hydrogens` are excluded from refinement.
///
/// # Panics
/// Under the same conditions as [`symmetry_of`].
pub fn label_of(g: &[Vec<usize>], invariants: &[u64], hydrogens: &BitSet) -> Vec<u64> {
    Canon::new(g, hydrogens).refine(invariants, Target::Labelling)
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Target {
    Symmetry,
    Labelling,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
enum Stage {
    Refining,
    StableSymmetry,
    DiscreteCanonical,
}

struct Canon<'a> {
    g: &'a [Vec<usize>],
    hydrogens: &'a BitSet,
}

impl<'a> Canon<'a> {
    fn new(g: &'a [Vec<usize>], hydrogens: &'a BitSet) -> Self {
        let ord = g.len();
        for (v, ws) in g.iter().enumerate() {
            for &w in ws {
                assert!(w < ord, "vertex {v} has out-of-range neighbour {w}");
                assert_ne!(w, v, "vertex {v} is adjacent to itself");
                assert!(
                    g[w].contains(&v),
                    "adjacency is not symmetric: {v} lists {w} but {w} does not list {v}"
                );
            }
        }
        for h in hydrogens.iter() {
            assert!(
                h < ord && g[h].len() == 1,
                "excluded hydrogen {h} must have exactly one neighbour"
            );
        }
        Self { g, hydrogens }
    }

    fn refine(&self, invariants: &[u64], target: Target) -> Vec<u64> {
        let ord = self.g.len();
        assert_eq!(
            invariants.len(),
            ord,
            "invariants must have one entry per vertex"
        );

        let tied: Vec<usize> = (0..ord).filter(|&v| !self.hydrogens.contains(v)).collect();
        let nnu = tied.len();

        // Ranks are 1-based, so rank r indexes primes[r] with r <= nnu.
        let primes = primes(nnu + 1);
        let mut ranker = InvariantRanker::new(nnu);
        let mut root = Node {
            ranks: vec![1; ord],
            curr: invariants.to_vec(),
            tied: Vec::with_capacity(nnu),
            distinct: 0,
        };
        root.distinct = ranker.rank(&tied, &mut root.tied, &root.curr, &mut root.ranks);

        let rounds = self.stabilize(&mut ranker, &primes, &mut root);
        debug!(
            stage = ?Stage::StableSymmetry,
            rounds,
            classes = root.distinct,
            "symmetry classes are stable"
        );

        let mut ranks = match target {
            Target::Symmetry => root.ranks,
            Target::Labelling => {
                let mut search = Search {
                    canon: self,
                    ranker,
                    primes,
                    invariants,
                    nnu,
                    best: None,
                    automorphisms: Vec::new(),
                    leaves: 0,
                };
                search.descend(root, &mut Vec::new());
                debug!(
                    stage = ?Stage::DiscreteCanonical,
                    leaves = search.leaves,
                    automorphisms = search.automorphisms.len(),
                    "canonical labelling found"
                );
                search
                    .best
                    .expect("search reaches at least one discrete partition")
                    .ranks
            }
        };

        self.rank_hydrogens(&mut ranks, invariants, nnu, target);
        ranks
    }

    /// Replace the invariant of every tied vertex by its neighbour prime
    /// product and re-rank until a round splits no class. Returns the number
    /// of rounds.
    fn stabilize(&self, ranker: &mut InvariantRanker, primes: &[u64], node: &mut Node) -> usize {
        let nnu = ranker.total();
        let mut next = Vec::with_capacity(node.tied.len());
        let mut rounds = 0;
        while node.distinct < nnu {
            rounds += 1;
            let before = node.distinct;
            for &v in &node.tied {
                node.curr[v] = self.prime_product(v, &node.ranks, primes);
            }
            node.distinct = ranker.rank(&node.tied, &mut next, &node.curr, &mut node.ranks);
            std::mem::swap(&mut node.tied, &mut next);
            trace!(
                stage = ?Stage::Refining,
                round = rounds,
                distinct = node.distinct,
                tied = node.tied.len(),
                "refined ranks"
            );
            if node.distinct == before {
                break;
            }
        }
        rounds
    }

    /// Split `v` off from its class: it sorts before its class mates.
    fn individualise(&self, ranker: &mut InvariantRanker, node: &Node, v: usize) -> Node {
        let mut child = node.clone();
        for &u in &node.tied {
            child.curr[u] = 1;
        }
        child.curr[v] = 0;
        child.tied.clear();
        child.distinct = ranker.rank(&node.tied, &mut child.tied, &child.curr, &mut child.ranks);
        child
    }

    fn prime_product(&self, v: usize, ranks: &[u64], primes: &[u64]) -> u64 {
        self.g[v]
            .iter()
            .filter(|&&w| !self.hydrogens.contains(w))
            .fold(1u64, |prod, &w| prod.wrapping_mul(primes[ranks[w] as usize]))
    }

    /// The graph relabelled by the discrete `ranks`: invariants in label
    /// order, then the sorted edge list in labels.
    fn certificate(&self, ranks: &[u64], invariants: &[u64], nnu: usize) -> Certificate {
        let mut by_label = vec![0; nnu];
        let mut edges = Vec::new();
        for v in (0..self.g.len()).filter(|&v| !self.hydrogens.contains(v)) {
            by_label[ranks[v] as usize - 1] = invariants[v];
            for &w in &self.g[v] {
                if !self.hydrogens.contains(w) && ranks[v] < ranks[w] {
                    edges.push((ranks[v], ranks[w]));
                }
            }
        }
        edges.sort_unstable();
        (by_label, edges)
    }

    /// Rank the excluded hydrogens after the `nnu` refined vertices, ordered
    /// by the rank of their parent and then by their own invariant.
    fn rank_hydrogens(&self, ranks: &mut [u64], invariants: &[u64], nnu: usize, target: Target) {
        let mut hs: Vec<usize> = self.hydrogens.iter().collect();
        if hs.is_empty() {
            return;
        }
        let first = nnu as u64 + 1;

        match target {
            Target::Labelling => {
                // Equal hydrogens on one parent are interchangeable; input
                // order decides between them.
                hs.sort_by_key(|&h| (ranks[self.g[h][0]], invariants[h], h));
                for (i, &h) in hs.iter().enumerate() {
                    ranks[h] = first + i as u64;
                }
            }
            Target::Symmetry => {
                let mut parents = vec![0; ranks.len()];
                for &h in &hs {
                    parents[h] = ranks[self.g[h][0]];
                    ranks[h] = first;
                }
                let mut ranker = InvariantRanker::new(hs.len());
                let mut next = Vec::new();
                ranker.rank(&hs, &mut next, &parents, ranks);
                ranker.rank(&hs, &mut next, invariants, ranks);
            }
        }
    }
}

/// Invariants in label order and the edges in labels.
type Certificate = (Vec<u64>, Vec<(u64, u64)>);

/// The ranking at one node of the search tree.
#[derive(Debug, Clone)]
struct Node {
    ranks: Vec<u64>,
    curr: Vec<u64>,
    /// Vertices sharing a rank with another vertex, lowest rank first.
    tied: Vec<usize>,
    distinct: usize,
}

#[derive(Debug)]
struct Leaf {
    certificate: Certificate,
    ranks: Vec<u64>,
}

/// Depth-first search over individualisations. Every member of the lowest
/// tied class is tried in turn, and the discrete ranking with the smallest
/// certificate wins. Leaves with equal certificates yield automorphisms,
/// which prune children lying in an already explored orbit.
struct Search<'c, 'a> {
    canon: &'c Canon<'a>,
    ranker: InvariantRanker,
    primes: Vec<u64>,
    invariants: &'c [u64],
    nnu: usize,
    best: Option<Leaf>,
    automorphisms: Vec<Vec<usize>>,
    leaves: usize,
}

impl Search<'_, '_> {
    fn descend(&mut self, node: Node, path: &mut Vec<usize>) {
        if node.distinct == self.nnu {
            self.visit_leaf(&node.ranks);
            return;
        }

        let lowest = node.ranks[node.tied[0]];
        let cell: Vec<usize> = node
            .tied
            .iter()
            .copied()
            .take_while(|&v| node.ranks[v] == lowest)
            .collect();

        let mut explored: Vec<usize> = Vec::with_capacity(cell.len());
        for v in cell {
            if !explored.is_empty() {
                let orbits = self.orbits_fixing(path);
                if explored.iter().any(|&u| orbits[u] == orbits[v]) {
                    trace!(depth = path.len(), vertex = v, "pruned by automorphism");
                    continue;
                }
            }

            let mut child = self.canon.individualise(&mut self.ranker, &node, v);
            self.canon.stabilize(&mut self.ranker, &self.primes, &mut child);
            trace!(depth = path.len(), vertex = v, distinct = child.distinct, "individualised");
            path.push(v);
            self.descend(child, path);
            path.pop();
            explored.push(v);
        }
    }

    fn visit_leaf(&mut self, ranks: &[u64]) {
        self.leaves += 1;
        let certificate = self.canon.certificate(ranks, self.invariants, self.nnu);
        let hydrogens = self.canon.hydrogens;
        match &self.best {
            Some(best) if certificate > best.certificate => {}
            Some(best) if certificate == best.certificate => {
                // Map every vertex to the vertex carrying its label in the
                // best leaf.
                let mut by_label = vec![0; self.nnu + 1];
                let refined = |v: &usize| !hydrogens.contains(*v);
                for v in (0..ranks.len()).filter(|v| refined(v)) {
                    by_label[best.ranks[v] as usize] = v;
                }
                let gamma = (0..ranks.len())
                    .map(|v| if refined(&v) { by_label[ranks[v] as usize] } else { v })
                    .collect();
                self.automorphisms.push(gamma);
            }
            _ => {
                self.best = Some(Leaf {
                    certificate,
                    ranks: ranks.to_vec(),
                })
            }
        }
    }

    /// Orbit representative of every vertex under the automorphisms found so
    /// far that fix each vertex of `path`.
    fn orbits_fixing(&self, path: &[usize]) -> Vec<usize> {
        let n = self.canon.g.len();
        let mut parent: Vec<usize> = (0..n).collect();
        let fixing = self
            .automorphisms
            .iter()
            .filter(|gamma| path.iter().all(|&p| gamma[p] == p));
        for gamma in fixing {
            for (v, &w) in gamma.iter().enumerate() {
                let (a, b) = (find(&mut parent, v), find(&mut parent, w));
                if a != b {
                    parent[a.max(b)] = a.min(b);
                }
            }
        }
        (0..n).map(|v| find(&mut parent, v)).collect()
    }
}

fn find(parent: &mut [usize], mut v: usize) -> usize {
    while parent[v] != v {
        parent[v] = parent[parent[v]];
        v = parent[v];
    }
    v
}
