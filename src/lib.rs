// Molecule definition: atoms, bonds, adjacency
pub mod molecule;

// Data IO
pub mod loader;

// Sorting invariants into ranks
pub mod ranker;

// Round-0 atom invariants and terminal hydrogens
pub mod invariants;

// The hard bit: iterative refinement to symmetry classes and canonical labels
pub mod canon;

// Legacy equivalence classes
pub mod partition;
pub mod morgan;

// Strategy selection and the public entry points
pub mod canonize;

// Utility functions
mod utils;

// Python library
#[cfg(feature = "python")]
pub mod python;

pub use canonize::{
    compute_basic_invariants, compute_canonical_labels, compute_symmetry_classes,
    identify_terminal_hydrogens, SymmetryMode,
};
