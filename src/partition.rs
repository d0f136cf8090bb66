//! Topological equivalence classes after Hu & Xu (1994).
//!
//! Every atom is described by a layered signature: its own atom value, then
//! for each distance `k` the sum of atom values `k` bonds away and the sum of
//! bond values linking that shell to the previous one. Classes from the
//! signatures are refined by summing neighbour classes weighted by bond
//! value until the number of classes stops growing.
//!
//! Bond values are doubled bond orders. A bond between two aromatic atoms
//! counts as aromatic, and so does every bond of a six-membered ring drawn
//! with strictly alternating single and double bonds, so a Kekulé ring is
//! not split by where its double bonds happen to be drawn.

use std::collections::HashSet;

use tracing::trace;

use crate::{
    molecule::{Bond, Molecule},
    utils::{dense_ranks, distances},
};

/// Equivalence classes of atoms: a class id in `1..=count` per atom.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Partition {
    classes: Vec<u64>,
    count: usize,
}

impl Partition {
    /// Build a partition from per-atom keys; two atoms share a class iff
    /// their keys are equal, and ids follow key order.
    pub fn from_values<K: Ord>(values: &[K]) -> Self {
        let (classes, count) = dense_ranks(values);
        Self { classes, count }
    }

    pub fn classes(&self) -> &[u64] {
        &self.classes
    }

    pub fn into_classes(self) -> Vec<u64> {
        self.classes
    }

    /// Number of distinct classes.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Return `true` iff both partitions group the atoms identically,
    /// whatever ids they use.
    pub fn same_grouping(&self, other: &Partition) -> bool {
        self.len() == other.len()
            && self.count == other.count
            && (0..self.len()).all(|u| {
                (0..u).all(|v| {
                    (self.classes[u] == self.classes[v]) == (other.classes[u] == other.classes[v])
                })
            })
    }
}

/// Partitions the atoms of one molecule with the Hu–Xu algorithm.
pub struct EquivalentClassPartitioner<'a> {
    mol: &'a Molecule,
    g: Vec<Vec<usize>>,
    dist: Vec<Vec<Option<u32>>>,
    kekule: HashSet<(usize, usize)>,
}

impl<'a> EquivalentClassPartitioner<'a> {
    pub fn new(mol: &'a Molecule) -> Self {
        let g = mol.adjacency();
        let dist = distances(&g);
        let kekule = kekule_ring_bonds(mol, &g);
        if !kekule.is_empty() {
            trace!(bonds = kekule.len(), "treating Kekulé ring bonds as aromatic");
        }
        Self {
            mol,
            g,
            dist,
            kekule,
        }
    }

    /// Compute the topological equivalence classes.
    pub fn partition(&self) -> Partition {
        let values = self.atom_values();
        let signatures: Vec<Vec<u64>> = (0..self.g.len())
            .map(|v| self.signature(v, &values))
            .collect();
        let (mut classes, mut count) = dense_ranks(&signatures);

        loop {
            let keys: Vec<(u64, u64)> = (0..self.g.len())
                .map(|v| {
                    let sum: u64 = self.g[v]
                        .iter()
                        .map(|&w| classes[w] * self.bond_value(v, w))
                        .sum();
                    (classes[v], sum)
                })
                .collect();
            let (next, next_count) = dense_ranks(&keys);
            trace!(classes = next_count, "refined Hu-Xu classes");
            if next_count <= count {
                break;
            }
            classes = next;
            count = next_count;
        }

        Partition { classes, count }
    }

    fn atom_values(&self) -> Vec<u64> {
        self.g
            .iter()
            .enumerate()
            .map(|(v, ws)| {
                let atom = self.mol.atom(v);
                let explicit = ws.iter().filter(|&&w| self.mol.atom(w).is_hydrogen()).count();
                let hydrogens = atom.hydrogens() as u64 + explicit as u64;
                let heavy = (ws.len() - explicit) as u64;
                (atom.element().atomic_number() as u64) << 24
                    | heavy.min(0xff) << 16
                    | hydrogens.min(0xff) << 8
                    | (atom.charge() as i16 + 128) as u64
            })
            .collect()
    }

    fn bond_value(&self, u: usize, v: usize) -> u64 {
        let (a, b) = (self.mol.atom(u), self.mol.atom(v));
        if (a.is_aromatic() && b.is_aromatic()) || self.kekule.contains(&(u.min(v), u.max(v))) {
            return Bond::Aromatic.doubled_order();
        }
        self.mol
            .bond(u, v)
            .map(|bond| bond.doubled_order())
            .unwrap_or(0)
    }

    /// `[value(v), atoms(1), bonds(1), atoms(2), bonds(2), ...]` for the
    /// shells around `v`.
    fn signature(&self, v: usize, values: &[u64]) -> Vec<u64> {
        let dist = &self.dist[v];
        let layers = dist.iter().flatten().copied().max().unwrap_or(0) as usize;
        let mut atoms = vec![0u64; layers + 1];
        let mut bonds = vec![0u64; layers + 1];

        for (w, d) in dist.iter().enumerate() {
            let Some(d) = *d else {
                continue;
            };
            let d = d as usize;
            if d == 0 {
                continue;
            }
            atoms[d] += values[w];
            for &x in &self.g[w] {
                if dist[x] == Some(d as u32 - 1) {
                    bonds[d] += self.bond_value(w, x);
                }
            }
        }

        let mut signature = Vec::with_capacity(2 * layers + 1);
        signature.push(values[v]);
        for k in 1..=layers {
            signature.push(atoms[k]);
            signature.push(bonds[k]);
        }
        signature
    }
}

const RING: usize = 6;

/// Bonds of six-membered rings whose bonds strictly alternate between single
/// and double, as `(u, v)` with `u < v`.
fn kekule_ring_bonds(mol: &Molecule, g: &[Vec<usize>]) -> HashSet<(usize, usize)> {
    let mut bonds = HashSet::new();
    let mut path = Vec::with_capacity(RING);
    for s in 0..g.len() {
        path.push(s);
        extend_ring(mol, g, &mut path, &mut bonds);
        path.pop();
    }
    bonds
}

/// Grow `path` into rings whose smallest atom is `path[0]`, visiting each
/// ring in one direction only.
fn extend_ring(
    mol: &Molecule,
    g: &[Vec<usize>],
    path: &mut Vec<usize>,
    bonds: &mut HashSet<(usize, usize)>,
) {
    let last = path[path.len() - 1];
    if path.len() == RING {
        if path[1] < last && g[last].contains(&path[0]) && alternates(mol, path) {
            for i in 0..RING {
                let (u, v) = (path[i], path[(i + 1) % RING]);
                bonds.insert((u.min(v), u.max(v)));
            }
        }
        return;
    }
    for &w in &g[last] {
        if w > path[0] && !path.contains(&w) {
            path.push(w);
            extend_ring(mol, g, path, bonds);
            path.pop();
        }
    }
}

fn alternates(mol: &Molecule, ring: &[usize]) -> bool {
    let bonds: Vec<Option<Bond>> = (0..ring.len())
        .map(|i| mol.bond(ring[i], ring[(i + 1) % ring.len()]))
        .collect();
    bonds
        .iter()
        .all(|b| matches!(b, Some(Bond::Single | Bond::Double)))
        && (0..bonds.len()).all(|i| bonds[i] != bonds[(i + 1) % bonds.len()])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::{Atom, Element};

    fn phenol(aromatic: bool) -> Molecule {
        let mut mol = Molecule::new();
        let o = mol.add_atom(Atom::new(Element::Oxygen).with_hydrogens(1));
        for i in 0..6 {
            let h = if i == 0 { 0 } else { 1 };
            mol.add_atom(Atom::new(Element::Carbon).with_hydrogens(h).with_aromatic(aromatic));
        }
        mol.add_bond(o, 1, Bond::Single).unwrap();
        for i in 0..6 {
            let bond = if i % 2 == 0 { Bond::Double } else { Bond::Single };
            mol.add_bond(1 + i, 1 + (i + 1) % 6, bond).unwrap();
        }
        mol
    }

    #[test]
    fn aromatic_phenol() {
        let partition = EquivalentClassPartitioner::new(&phenol(true)).partition();
        assert_eq!(partition.count(), 5);
        assert_eq!(partition.classes(), &[5, 4, 3, 2, 1, 2, 3]);
    }

    #[test]
    fn kekule_phenol_without_aromatic_flags() {
        // The alternating ring counts as aromatic, so ortho and meta carbons
        // pair up whichever way the double bonds are drawn.
        let mol = phenol(false);
        let partition = EquivalentClassPartitioner::new(&mol).partition();
        assert_eq!(partition.count(), 5);
        assert_eq!(partition.classes(), &[5, 4, 3, 2, 1, 2, 3]);
        assert!(partition.same_grouping(&Partition::from_values(&crate::canon::symmetry(&mol))));
    }

    #[test]
    fn only_alternating_six_rings_are_kekule() {
        let mol = phenol(false);
        let bonds = kekule_ring_bonds(&mol, &mol.adjacency());
        let mut bonds: Vec<_> = bonds.into_iter().collect();
        bonds.sort_unstable();
        assert_eq!(bonds, vec![(1, 2), (1, 6), (2, 3), (3, 4), (4, 5), (5, 6)]);

        // Cyclohexene has one double bond; it must keep its bond values.
        let mut cyclohexene = Molecule::new();
        for i in 0..6 {
            let h = if i < 2 { 1 } else { 2 };
            cyclohexene.add_atom(Atom::new(Element::Carbon).with_hydrogens(h));
        }
        for i in 0..6 {
            let bond = if i == 0 { Bond::Double } else { Bond::Single };
            cyclohexene.add_bond(i, (i + 1) % 6, bond).unwrap();
        }
        assert!(kekule_ring_bonds(&cyclohexene, &cyclohexene.adjacency()).is_empty());
        let partition = EquivalentClassPartitioner::new(&cyclohexene).partition();
        assert_eq!(partition.count(), 3);
    }

    #[test]
    fn kekule_benzene_is_one_class() {
        for aromatic in [false, true] {
            let mut mol = Molecule::new();
            for _ in 0..6 {
                mol.add_atom(Atom::new(Element::Carbon).with_hydrogens(1).with_aromatic(aromatic));
            }
            for i in 0..6 {
                let bond = if i % 2 == 0 { Bond::Double } else { Bond::Single };
                mol.add_bond(i, (i + 1) % 6, bond).unwrap();
            }
            let partition = EquivalentClassPartitioner::new(&mol).partition();
            assert_eq!(partition.classes(), &[1; 6]);
            assert_eq!(partition.count(), 1);
        }
    }

    #[test]
    fn disconnected_atoms() {
        let mut mol = Molecule::new();
        mol.add_atom(Atom::new(Element::Sodium).with_charge(1));
        mol.add_atom(Atom::new(Element::Chlorine).with_charge(-1));
        mol.add_atom(Atom::new(Element::Sodium).with_charge(1));
        let partition = EquivalentClassPartitioner::new(&mol).partition();
        assert_eq!(partition.classes(), &[1, 2, 1]);
    }

    #[test]
    fn grouping_ignores_ids() {
        let a = Partition::from_values(&[7, 3, 7, 1]);
        let b = Partition::from_values(&[1, 2, 1, 3]);
        let c = Partition::from_values(&[1, 1, 2, 3]);
        assert_eq!(a.classes(), &[3, 2, 3, 1]);
        assert!(a.same_grouping(&b));
        assert!(!a.same_grouping(&c));
    }
}
