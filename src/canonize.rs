//! Canonical labels and symmetry classes for whole molecules.
//!
//! This is the surface other code is expected to call. The refinement engine
//! in [`crate::canon`] is the default strategy for symmetry classes; the
//! Hu–Xu partitioner and Morgan numbers are kept as alternatives for callers
//! that depend on their groupings. Strategies agree on how atoms are grouped
//! for ordinary molecules, not on the class ids they hand out.

use clap::ValueEnum;
use rayon::prelude::*;

use crate::{
    canon,
    invariants::{basic_invariants, terminal_hydrogens},
    molecule::Molecule,
    morgan::morgan_classes,
    partition::{EquivalentClassPartitioner, Partition},
};

/// Algorithm for computing symmetry classes.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
pub enum SymmetryMode {
    /// Iterative refinement of atom invariants.
    #[default]
    Canon,
    /// Layered topological classes of Hu & Xu (1994).
    HuXu,
    /// Morgan's extended connectivity (1965).
    Morgan,
}

/// Symmetry class of every atom: equal values mark atoms that refinement
/// cannot tell apart.
pub fn compute_symmetry_classes(mol: &Molecule) -> Vec<u64> {
    canon::symmetry(mol)
}

/// Canonical label of every atom: `1..=atom_count`, independent of the input
/// atom order.
pub fn compute_canonical_labels(mol: &Molecule) -> Vec<u64> {
    canon::label(mol)
}

/// Round-0 invariants from local atom properties only.
pub fn compute_basic_invariants(mol: &Molecule) -> Vec<u64> {
    basic_invariants(mol, &mol.adjacency())
}

/// `true` for every hydrogen that canonicalization ranks after its parent
/// instead of refining.
pub fn identify_terminal_hydrogens(mol: &Molecule) -> Vec<bool> {
    let hydrogens = terminal_hydrogens(mol, &mol.adjacency());
    (0..mol.atom_count()).map(|v| hydrogens.contains(v)).collect()
}

/// Partition the atoms of `mol` into symmetry classes using the algorithm
/// specified by `mode`.
pub fn symmetry_classes(mol: &Molecule, mode: SymmetryMode) -> Partition {
    match mode {
        SymmetryMode::Canon => Partition::from_values(&canon::symmetry(mol)),
        SymmetryMode::HuXu => EquivalentClassPartitioner::new(mol).partition(),
        SymmetryMode::Morgan => morgan_classes(mol),
    }
}

/// List atom indices in canonical order: `order[i]` is the atom labelled
/// `i + 1`.
pub fn canonical_order(labels: &[u64]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..labels.len()).collect();
    order.sort_by_key(|&v| labels[v]);
    order
}

/// Renumber the atoms of `mol` in canonical order. Two inputs that differ
/// only in atom order yield the same atoms and connectivity.
pub fn canonical_form(mol: &Molecule) -> Molecule {
    let order = canonical_order(&canon::label(mol));
    let mut perm = vec![0; order.len()];
    for (i, &v) in order.iter().enumerate() {
        perm[v] = i;
    }
    mol.permute(&perm)
}

/// [`symmetry_classes`] over many molecules in parallel.
pub fn symmetry_classes_par(mols: &[Molecule], mode: SymmetryMode) -> Vec<Partition> {
    mols.par_iter()
        .map(|mol| symmetry_classes(mol, mode))
        .collect()
}

/// [`compute_canonical_labels`] over many molecules in parallel.
pub fn canonical_labels_par(mols: &[Molecule]) -> Vec<Vec<u64>> {
    mols.par_iter().map(canon::label).collect()
}
