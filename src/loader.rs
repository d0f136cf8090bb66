//! Load molecules from plain CSV atom/bond tables.
//!
//! Records are headerless, whitespace-trimmed and may be commented with `#`:
//!
//! ```text
//! atom,<symbol>,<charge>,<implicit H>[,<mass>][,aromatic]
//! bond,<from>,<to>,<order>
//! end
//! ```
//!
//! Atom indices in bond records are 0-based positions among the atom records
//! of the same molecule; bond orders are 1, 2, 3 or 4 (aromatic). `end`
//! closes a molecule, and a trailing molecule without `end` is accepted.

use std::{fs, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use thiserror::Error;
use tracing::debug;

use crate::molecule::{
    Atom, Bond, Element, Molecule, MoleculeError, ParseBondError, ParseElementError,
};

/// Thrown when a table cannot be read or describes an invalid molecule.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("line {line}: {message}")]
    Record { line: u64, message: String },
    #[error("line {line}: {source}")]
    Element {
        line: u64,
        #[source]
        source: ParseElementError,
    },
    #[error("line {line}: {source}")]
    Bond {
        line: u64,
        #[source]
        source: ParseBondError,
    },
    #[error("line {line}: {source}")]
    Molecule {
        line: u64,
        #[source]
        source: MoleculeError,
    },
}

/// Load every molecule in the table at `p`.
pub fn parse(p: &Path) -> Result<Vec<Molecule>, LoadError> {
    let contents = fs::read_to_string(p)?;
    let mols = parse_table_str(&contents)?;
    debug!(path = %p.display(), molecules = mols.len(), "loaded table");
    Ok(mols)
}

/// Load every molecule in the table `input`.
pub fn parse_table_str(input: &str) -> Result<Vec<Molecule>, LoadError> {
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(Trim::All)
        .comment(Some(b'#'))
        .from_reader(input.as_bytes());

    let mut mols = Vec::new();
    let mut curr = Molecule::new();
    let mut open = false;

    for result in reader.records() {
        let record = result?;
        let line = record.position().map_or(0, |p| p.line());
        match record.get(0).unwrap_or_default() {
            "atom" => {
                curr.add_atom(parse_atom(&record, line)?);
                open = true;
            }
            "bond" => {
                let (u, v, bond) = parse_bond(&record, line)?;
                curr.add_bond(u, v, bond)
                    .map_err(|source| LoadError::Molecule { line, source })?;
                open = true;
            }
            "end" => {
                mols.push(std::mem::take(&mut curr));
                open = false;
            }
            "" => continue,
            kind => {
                return Err(LoadError::Record {
                    line,
                    message: format!("unknown record kind {kind:?}"),
                })
            }
        }
    }
    if open {
        mols.push(curr);
    }
    Ok(mols)
}

fn parse_atom(record: &StringRecord, line: u64) -> Result<Atom, LoadError> {
    let symbol = field(record, 1, line)?;
    let element: Element = symbol
        .parse()
        .map_err(|source| LoadError::Element { line, source })?;
    let charge: i8 = number(record, 2, line)?;
    let hydrogens: u8 = number(record, 3, line)?;

    let mut atom = Atom::new(element)
        .with_charge(charge)
        .with_hydrogens(hydrogens);
    for extra in record.iter().skip(4).filter(|f| !f.is_empty()) {
        if extra == "aromatic" {
            atom = atom.with_aromatic(true);
        } else {
            let mass = extra.parse().map_err(|_| LoadError::Record {
                line,
                message: format!("invalid mass number {extra:?}"),
            })?;
            atom = atom.with_mass(mass);
        }
    }
    Ok(atom)
}

fn parse_bond(record: &StringRecord, line: u64) -> Result<(usize, usize, Bond), LoadError> {
    let u = number(record, 1, line)?;
    let v = number(record, 2, line)?;
    let order: usize = number(record, 3, line)?;
    let bond = Bond::try_from(order).map_err(|source| LoadError::Bond { line, source })?;
    Ok((u, v, bond))
}

fn field<'r>(record: &'r StringRecord, i: usize, line: u64) -> Result<&'r str, LoadError> {
    record
        .get(i)
        .filter(|f| !f.is_empty())
        .ok_or_else(|| LoadError::Record {
            line,
            message: format!("missing field {i} in {:?} record", record.get(0).unwrap_or_default()),
        })
}

fn number<T: std::str::FromStr>(record: &StringRecord, i: usize, line: u64) -> Result<T, LoadError> {
    let f = field(record, i, line)?;
    f.parse().map_err(|_| LoadError::Record {
        line,
        message: format!("invalid number {f:?} in field {i}"),
    })
}
