use clap::ValueEnum;
use pyo3::{exceptions::PyValueError, prelude::*};

use crate::{
    canonize::{compute_canonical_labels, symmetry_classes, SymmetryMode},
    loader::parse_table_str,
    molecule::Molecule,
};

fn parse_one(table: &str) -> PyResult<Molecule> {
    let mut mols = parse_table_str(table).map_err(|e| PyValueError::new_err(e.to_string()))?;
    match mols.len() {
        1 => Ok(mols.remove(0)),
        n => Err(PyValueError::new_err(format!(
            "expected exactly one molecule, found {n}"
        ))),
    }
}

/// Symmetry classes of the molecule in a CSV atom/bond table. `mode` is one
/// of "canon", "hu-xu" or "morgan".
#[pyfunction]
#[pyo3(name = "symmetry_classes", signature = (table, mode = "canon"))]
fn symmetry_classes_of(table: String, mode: &str) -> PyResult<Vec<u64>> {
    let mode = SymmetryMode::from_str(mode, true).map_err(PyValueError::new_err)?;
    let mol = parse_one(&table)?;
    Ok(symmetry_classes(&mol, mode).into_classes())
}

/// Canonical labels of the molecule in a CSV atom/bond table.
#[pyfunction]
fn canonical_labels(table: String) -> PyResult<Vec<u64>> {
    let mol = parse_one(&table)?;
    Ok(compute_canonical_labels(&mol))
}

/// A Python module implemented in Rust. The name of this function must match
/// the `lib.name` setting in the `Cargo.toml`, else Python will not be able to
/// import the module.
#[pymodule]
#[pyo3(name = "molcanon")]
fn _molcanon(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(symmetry_classes_of, m)?)?;
    m.add_function(wrap_pyfunction!(canonical_labels, m)?)?;

    Ok(())
}
