use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{ArgAction, Parser, ValueEnum};
use rayon::prelude::*;
use tracing::{info, trace, Level};

use molcanon::{
    canonize::{canonical_labels_par, symmetry_classes_par, SymmetryMode},
    compute_basic_invariants, identify_terminal_hydrogens, loader,
    molecule::Molecule,
    morgan::morgan_numbers,
};

#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, ValueEnum, Debug, Default)]
enum Output {
    /// Symmetry class of every atom.
    #[default]
    Symmetry,
    /// Canonical label of every atom.
    Canonical,
    /// Round-0 atom invariants.
    Invariants,
    /// 1 for terminal hydrogens, 0 otherwise.
    Hydrogens,
    /// Morgan numbers.
    Morgan,
}

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// CSV atom/bond tables to read.
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    #[arg(short, long, value_enum, default_value_t)]
    output: Output,

    /// Algorithm used for `--output symmetry`.
    #[arg(short, long, value_enum, default_value_t)]
    mode: SymmetryMode,

    /// Increase logging verbosity (repeat for more).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut names = Vec::new();
    let mut mols = Vec::new();
    for path in &cli.paths {
        let loaded =
            loader::parse(path).with_context(|| format!("failed to load {}", path.display()))?;
        info!(path = %path.display(), molecules = loaded.len(), "loaded");
        for (i, mol) in loaded.into_iter().enumerate() {
            trace!("molecule {}:\n{}", i + 1, mol.info());
            names.push(format!("{}:{}", path.display(), i + 1));
            mols.push(mol);
        }
    }

    let rows = compute(&mols, cli.output, cli.mode);
    for (name, row) in names.iter().zip(rows) {
        let values: Vec<String> = row.iter().map(u64::to_string).collect();
        println!("{name}: {}", values.join(" "));
    }
    Ok(())
}

fn compute(mols: &[Molecule], output: Output, mode: SymmetryMode) -> Vec<Vec<u64>> {
    match output {
        Output::Symmetry => symmetry_classes_par(mols, mode)
            .into_iter()
            .map(|p| p.into_classes())
            .collect(),
        Output::Canonical => canonical_labels_par(mols),
        Output::Invariants => mols.par_iter().map(compute_basic_invariants).collect(),
        Output::Hydrogens => mols
            .par_iter()
            .map(|mol| {
                identify_terminal_hydrogens(mol)
                    .into_iter()
                    .map(u64::from)
                    .collect()
            })
            .collect(),
        Output::Morgan => mols.par_iter().map(morgan_numbers).collect(),
    }
}
