//! Test symmetry classes and canonical labels against the reference molecules.

use std::{collections::HashMap, ffi::OsStr, fs, path::Path};

use csv::Reader;

use molcanon::{
    canonize::{symmetry_classes, SymmetryMode},
    compute_canonical_labels, compute_symmetry_classes, loader,
    molecule::Molecule,
};

struct Expected {
    symmetry: Vec<u64>,
    labels: Vec<u64>,
    classes: usize,
    hu_xu_classes: usize,
}

fn values(field: &str) -> Vec<u64> {
    field
        .split_whitespace()
        .map(|x| x.parse::<u64>().expect("non-integer value"))
        .collect()
}

fn load_expected() -> HashMap<String, Expected> {
    // Set up CSV reader for data/reference/expected.csv.
    let path = Path::new("data").join("reference").join("expected.csv");
    let mut reader = Reader::from_path(path).expect("reference/expected.csv does not exist.");

    // Load expected records.
    let mut expected = HashMap::new();
    for result in reader.records() {
        let record = result.expect("expected.csv is malformed.");
        expected.insert(
            record[0].to_string(),
            Expected {
                symmetry: values(&record[1]),
                labels: values(&record[2]),
                classes: record[3].parse().expect("non-integer class count"),
                hu_xu_classes: record[4].parse().expect("non-integer class count"),
            },
        );
    }
    expected
}

fn load_molecule(name: &str) -> Molecule {
    let path = Path::new("data").join("reference").join(format!("{name}.csv"));
    let mut mols = loader::parse(&path).expect(&format!("Failed to parse {path:?}"));
    assert_eq!(mols.len(), 1, "{name}.csv should hold one molecule");
    mols.remove(0)
}

fn reference_names() -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(Path::new("data").join("reference"))
        .unwrap()
        .filter_map(|r| r.ok())
        .map(|r| r.path())
        .filter(|p| p.extension().and_then(OsStr::to_str) == Some("csv"))
        .filter_map(|p| p.file_stem().and_then(OsStr::to_str).map(str::to_string))
        .filter(|name| name != "expected")
        .collect();
    names.sort();
    names
}

#[test]
fn every_molecule_has_expected_values() {
    let expected = load_expected();
    let names = reference_names();
    assert_eq!(names.len(), expected.len());
    for name in names {
        assert!(expected.contains_key(&name), "no expected values for {name}");
    }
}

#[test]
fn reference_symmetry_classes() {
    let mut incorrect = Vec::new();
    for (name, expected) in load_expected() {
        let classes = compute_symmetry_classes(&load_molecule(&name));
        if classes != expected.symmetry {
            incorrect.push((name, expected.symmetry, classes));
        }
    }
    assert!(
        incorrect.is_empty(),
        "symmetry classes differ for {} molecule(s): {incorrect:?}",
        incorrect.len()
    );
}

#[test]
fn reference_canonical_labels() {
    let mut incorrect = Vec::new();
    for (name, expected) in load_expected() {
        let labels = compute_canonical_labels(&load_molecule(&name));
        if labels != expected.labels {
            incorrect.push((name, expected.labels, labels));
        }
    }
    assert!(
        incorrect.is_empty(),
        "canonical labels differ for {} molecule(s): {incorrect:?}",
        incorrect.len()
    );
}

#[test]
fn reference_class_counts() {
    for (name, expected) in load_expected() {
        let mol = load_molecule(&name);
        assert_eq!(
            symmetry_classes(&mol, SymmetryMode::Canon).count(),
            expected.classes,
            "{name}"
        );
        assert_eq!(
            symmetry_classes(&mol, SymmetryMode::HuXu).count(),
            expected.hu_xu_classes,
            "{name}"
        );
    }
}

#[test]
fn labels_refine_symmetry_classes() {
    for (name, _) in load_expected() {
        let mol = load_molecule(&name);
        let classes = compute_symmetry_classes(&mol);
        let labels = compute_canonical_labels(&mol);

        let mut sorted = labels.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (1..=mol.atom_count() as u64).collect::<Vec<_>>(), "{name}");

        // An atom in class c is labelled within c..c + |c| - 1.
        for v in 0..mol.atom_count() {
            let size = classes.iter().filter(|&&c| c == classes[v]).count() as u64;
            assert!(
                classes[v] <= labels[v] && labels[v] < classes[v] + size,
                "{name}: atom {v} in class {} labelled {}",
                classes[v],
                labels[v]
            );
        }
    }
}

#[test]
fn explicit_hydrogens_follow_heavy_atoms() {
    let implicit = compute_symmetry_classes(&load_molecule("phenol"));
    let explicit = compute_symmetry_classes(&load_molecule("phenol_explicit_h"));
    assert_eq!(&explicit[..implicit.len()], &implicit[..]);
    assert!(explicit[implicit.len()..].iter().all(|&c| c > implicit.len() as u64));
}

#[test]
fn kekule_and_aromatic_phenol_agree() {
    let kekule = load_molecule("phenol");
    let aromatic = load_molecule("phenol_aromatic");
    assert_eq!(
        compute_symmetry_classes(&kekule),
        compute_symmetry_classes(&aromatic)
    );
    for mode in [SymmetryMode::Canon, SymmetryMode::HuXu, SymmetryMode::Morgan] {
        let a = symmetry_classes(&kekule, mode);
        let b = symmetry_classes(&aromatic, mode);
        assert!(a.same_grouping(&b), "{mode:?}");
        assert!(a.same_grouping(&symmetry_classes(&kekule, SymmetryMode::Canon)), "{mode:?}");
    }
}
