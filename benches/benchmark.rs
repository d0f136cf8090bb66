use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use std::ffi::OsStr;
use std::fs;
use std::path::Path;

use molcanon::{
    canonize::{symmetry_classes, SymmetryMode},
    compute_canonical_labels, loader,
    molecule::{Atom, Bond, Element, Molecule},
};

/// An aromatic polyacene of `rings` fused six-membered rings.
fn polyacene(rings: usize) -> Molecule {
    let mut mol = Molecule::new();
    let aromatic = |h| {
        Atom::new(Element::Carbon)
            .with_hydrogens(h)
            .with_aromatic(true)
    };

    // Two rows of rings + 1 fusion atoms joined by rungs, plus one CH cap
    // above and below every ring.
    let end = |i: usize| u8::from(i == 0 || i == rings);
    let top: Vec<usize> = (0..=rings).map(|i| mol.add_atom(aromatic(end(i)))).collect();
    let bottom: Vec<usize> = (0..=rings).map(|i| mol.add_atom(aromatic(end(i)))).collect();
    for i in 0..=rings {
        mol.add_bond(top[i], bottom[i], Bond::Aromatic).unwrap();
    }
    for i in 0..rings {
        for row in [&top, &bottom] {
            let cap = mol.add_atom(aromatic(1));
            mol.add_bond(row[i], cap, Bond::Aromatic).unwrap();
            mol.add_bond(cap, row[i + 1], Bond::Aromatic).unwrap();
        }
    }
    mol
}

/// A saturated carbon chain with explicit hydrogens.
fn alkane(carbons: usize) -> Molecule {
    let mut mol = Molecule::new();
    let mut prev = None;
    for i in 0..carbons {
        let c = mol.add_atom(Atom::new(Element::Carbon));
        if let Some(p) = prev {
            mol.add_bond(p, c, Bond::Single).unwrap();
        }
        let ends = usize::from(i == 0) + usize::from(i + 1 == carbons);
        for _ in 0..(2 + ends) {
            let h = mol.add_atom(Atom::new(Element::Hydrogen));
            mol.add_bond(c, h, Bond::Single).unwrap();
        }
        prev = Some(c);
    }
    mol
}

pub fn synthetic(c: &mut Criterion) {
    // Define a new criterion benchmark group of generated molecules.
    let mut group = c.benchmark_group("synthetic");

    let mols = [
        ("alkane_40", alkane(40)),
        ("polyacene_8", polyacene(8)),
        ("polyacene_32", polyacene(32)),
    ];
    let modes = [SymmetryMode::Canon, SymmetryMode::HuXu, SymmetryMode::Morgan];
    let mode_strs = ["canon", "hu_xu", "morgan"];

    for (name, mol) in mols.iter() {
        for (mode, mode_str) in modes.iter().zip(mode_strs) {
            group.bench_with_input(BenchmarkId::new(*name, mode_str), mode, |b, &mode| {
                b.iter(|| symmetry_classes(mol, mode));
            });
        }
        group.bench_with_input(BenchmarkId::new(*name, "labels"), mol, |b, mol| {
            b.iter(|| compute_canonical_labels(mol));
        });
    }

    group.finish();
}

pub fn reference_molecules(c: &mut Criterion) {
    // Load every molecule from the reference tables.
    let mut mol_list: Vec<Molecule> = Vec::new();
    for path in fs::read_dir(Path::new("data").join("reference")).unwrap() {
        let name = path.unwrap().path();
        if name.extension().and_then(OsStr::to_str) != Some("csv")
            || name.file_stem().and_then(OsStr::to_str) == Some("expected")
        {
            continue;
        }
        mol_list.extend(loader::parse(&name).expect(&format!("Failed to parse {name:?}")));
    }

    c.bench_function("reference_labels", |b| {
        b.iter(|| {
            for mol in &mol_list {
                compute_canonical_labels(mol);
            }
        });
    });
}

criterion_group! {
    name = benchmark;
    config = Criterion::default().sample_size(20);
    targets = synthetic, reference_molecules
}
criterion_main!(benchmark);
