//! Local (round-0) atom invariants.
//!
//! Each atom's invariant packs its local properties into one `u64`, most
//! significant field first:
//!
//! | bits   | field                                            |
//! |--------|--------------------------------------------------|
//! | 56..64 | total connectivity (degree + implicit H)         |
//! | 48..56 | heavy degree (degree - explicit H neighbours)    |
//! | 40..48 | atomic number                                    |
//! | 24..40 | isotope mass number, 0 if unspecified            |
//! | 16..24 | formal charge + 128                              |
//! |  8..16 | total hydrogen count (implicit + explicit)       |
//! |  0..8  | aromatic flag                                    |
//!
//! Counts saturate at 255. Two atoms have equal invariants iff they agree on
//! every field, and comparison follows the field order above.

use bit_set::BitSet;

use crate::molecule::{Atom, Molecule};

/// Compute the basic invariant of every atom of `mol`, where `g` is its
/// adjacency (see [`Molecule::adjacency`]).
///
/// # Panics
/// If `g` does not have one entry per atom.
pub fn basic_invariants(mol: &Molecule, g: &[Vec<usize>]) -> Vec<u64> {
    assert_eq!(
        g.len(),
        mol.atom_count(),
        "adjacency must have one entry per atom"
    );
    g.iter()
        .enumerate()
        .map(|(v, ws)| {
            let explicit = ws.iter().filter(|&&w| mol.atom(w).is_hydrogen()).count();
            pack(mol.atom(v), ws.len(), explicit)
        })
        .collect()
}

fn pack(atom: &Atom, degree: usize, explicit: usize) -> u64 {
    let implicit = atom.hydrogens() as usize;
    let byte = |x: usize| x.min(0xff) as u64;

    let mut label = byte(degree + implicit);
    label = (label << 8) | byte(degree - explicit);
    label = (label << 8) | atom.element().atomic_number() as u64;
    label = (label << 16) | atom.mass().unwrap_or(0) as u64;
    label = (label << 8) | (atom.charge() as i16 + 128) as u64;
    label = (label << 8) | byte(implicit + explicit);
    (label << 8) | atom.is_aromatic() as u64
}

/// Flag the hydrogens that can be left out of the refinement graph: neutral
/// hydrogens without an isotope label that have exactly one neighbour, which
/// is not itself a hydrogen.
///
/// Bridging hydrogens, lone hydrogen ions and molecular hydrogen are never
/// flagged.
///
/// # Panics
/// If `g` does not have one entry per atom.
pub fn terminal_hydrogens(mol: &Molecule, g: &[Vec<usize>]) -> BitSet {
    assert_eq!(
        g.len(),
        mol.atom_count(),
        "adjacency must have one entry per atom"
    );
    let mut hydrogens = BitSet::with_capacity(g.len());
    for (v, ws) in g.iter().enumerate() {
        let atom = mol.atom(v);
        let terminal = atom.is_hydrogen()
            && atom.charge() == 0
            && atom.mass().is_none()
            && ws.len() == 1
            && !mol.atom(ws[0]).is_hydrogen();
        if terminal {
            hydrogens.insert(v);
        }
    }
    hydrogens
}
