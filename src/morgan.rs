//! Morgan numbers (extended connectivity).
//!
//! Each atom starts from its number of non-hydrogen neighbours, and every
//! round replaces that value by the sum of its non-hydrogen neighbours'
//! previous values. The sums grow geometrically, so arithmetic wraps.

use tracing::trace;

use crate::{molecule::Molecule, partition::Partition, utils::dense_ranks};

/// Adjacency lists plus a 0/1 weight per atom that masks out hydrogens.
fn heavy_graph(mol: &Molecule) -> (Vec<Vec<usize>>, Vec<u64>) {
    let heavy = mol.atoms().map(|a| (!a.is_hydrogen()) as u64).collect();
    (mol.adjacency(), heavy)
}

fn initial_values(g: &[Vec<usize>], heavy: &[u64]) -> Vec<u64> {
    g.iter()
        .map(|ws| ws.iter().map(|&w| heavy[w]).sum())
        .collect()
}

/// One round: every atom takes the sum of its heavy neighbours' values.
fn step(g: &[Vec<usize>], heavy: &[u64], prev: &[u64], curr: &mut [u64]) {
    for (u, ws) in g.iter().enumerate() {
        curr[u] = ws
            .iter()
            .fold(0u64, |sum, &w| sum.wrapping_add(prev[w].wrapping_mul(heavy[w])));
    }
}

/// Compute the Morgan number of every atom after `atom_count` rounds.
pub fn morgan_numbers(mol: &Molecule) -> Vec<u64> {
    let (g, heavy) = heavy_graph(mol);
    let mut curr = initial_values(&g, &heavy);
    let mut prev = vec![0; g.len()];

    for _ in 0..g.len() {
        std::mem::swap(&mut curr, &mut prev);
        step(&g, &heavy, &prev, &mut curr);
    }
    curr
}

/// Classical extended connectivity: iterate from the heavy degrees and stop
/// as soon as a round fails to increase the number of distinct values.
/// Returns the values of the last round that did.
pub fn extended_connectivity(mol: &Molecule) -> Vec<u64> {
    let (g, heavy) = heavy_graph(mol);
    let mut curr = initial_values(&g, &heavy);
    let mut count = dense_ranks(&curr).1;
    let mut next = vec![0; g.len()];

    loop {
        step(&g, &heavy, &curr, &mut next);
        let next_count = dense_ranks(&next).1;
        trace!(distinct = next_count, "extended connectivity round");
        if next_count <= count {
            return curr;
        }
        std::mem::swap(&mut curr, &mut next);
        count = next_count;
    }
}

/// Morgan numbers prefixed with the element symbol, e.g. `"C-457"`.
pub fn morgan_numbers_with_symbols(mol: &Molecule) -> Vec<String> {
    mol.atoms()
        .zip(morgan_numbers(mol))
        .map(|(atom, number)| format!("{}-{number}", atom.element()))
        .collect()
}

/// Group atoms by element and Morgan number.
pub fn morgan_classes(mol: &Molecule) -> Partition {
    let numbers = morgan_numbers(mol);
    let keys: Vec<(u8, u64)> = mol
        .atoms()
        .zip(numbers)
        .map(|(atom, number)| (atom.element().atomic_number(), number))
        .collect();
    Partition::from_values(&keys)
}
