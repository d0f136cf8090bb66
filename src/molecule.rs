//! Graph-theoretic representation of a molecule.
//!
//! Atoms are addressed by dense 0-based indices into a `petgraph` arena;
//! the canonicalization algorithms work on the flat adjacency lists returned
//! by [`Molecule::adjacency`].

use std::{fmt::Display, str::FromStr};

use petgraph::{
    dot::Dot,
    graph::{Graph, NodeIndex},
    visit::EdgeRef,
    Undirected,
};
use thiserror::Error;

pub(crate) type Index = u32;
pub(crate) type MGraph = Graph<Atom, Bond, Undirected, Index>;

/// Thrown by [`Element::from_str`] if the string does not represent a valid
/// chemical element.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown element symbol {0:?}")]
pub struct ParseElementError(pub String);

macro_rules! periodic_table {
    ( $(($element:ident, $name:literal),)* ) => {
        /// Represents a chemical element.
        ///
        /// Variants are declared in periodic-table order, so the atomic
        /// number is the discriminant plus one.
        #[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum Element {
            $( $element, )*
        }

        impl Display for Element {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match &self {
                    $( Element::$element => write!(f, "{}", $name), )*
                }
            }
        }

        impl FromStr for Element {
            type Err = ParseElementError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $( $name => Ok(Element::$element), )*
                    _ => Err(ParseElementError(s.to_string())),
                }
            }
        }
    };
}

periodic_table!(
    (Hydrogen, "H"),
    (Helium, "He"),
    (Lithium, "Li"),
    (Beryllium, "Be"),
    (Boron, "B"),
    (Carbon, "C"),
    (Nitrogen, "N"),
    (Oxygen, "O"),
    (Fluorine, "F"),
    (Neon, "Ne"),
    (Sodium, "Na"),
    (Magnesium, "Mg"),
    (Aluminum, "Al"),
    (Silicon, "Si"),
    (Phosphorus, "P"),
    (Sulfur, "S"),
    (Chlorine, "Cl"),
    (Argon, "Ar"),
    (Potassium, "K"),
    (Calcium, "Ca"),
    (Scandium, "Sc"),
    (Titanium, "Ti"),
    (Vanadium, "V"),
    (Chromium, "Cr"),
    (Manganese, "Mn"),
    (Iron, "Fe"),
    (Cobalt, "Co"),
    (Nickel, "Ni"),
    (Copper, "Cu"),
    (Zinc, "Zn"),
    (Gallium, "Ga"),
    (Germanium, "Ge"),
    (Arsenic, "As"),
    (Selenium, "Se"),
    (Bromine, "Br"),
    (Krypton, "Kr"),
    (Rubidium, "Rb"),
    (Strontium, "Sr"),
    (Yttrium, "Y"),
    (Zirconium, "Zr"),
    (Niobium, "Nb"),
    (Molybdenum, "Mo"),
    (Technetium, "Tc"),
    (Ruthenium, "Ru"),
    (Rhodium, "Rh"),
    (Palladium, "Pd"),
    (Silver, "Ag"),
    (Cadmium, "Cd"),
    (Indium, "In"),
    (Tin, "Sn"),
    (Antimony, "Sb"),
    (Tellurium, "Te"),
    (Iodine, "I"),
    (Xenon, "Xe"),
    (Cesium, "Cs"),
    (Barium, "Ba"),
    (Lanthanum, "La"),
    (Cerium, "Ce"),
    (Praseodymium, "Pr"),
    (Neodymium, "Nd"),
    (Promethium, "Pm"),
    (Samarium, "Sm"),
    (Europium, "Eu"),
    (Gadolinium, "Gd"),
    (Terbium, "Tb"),
    (Dysprosium, "Dy"),
    (Holmium, "Ho"),
    (Erbium, "Er"),
    (Thulium, "Tm"),
    (Ytterbium, "Yb"),
    (Lutetium, "Lu"),
    (Hafnium, "Hf"),
    (Tantalum, "Ta"),
    (Wolfram, "W"),
    (Rhenium, "Re"),
    (Osmium, "Os"),
    (Iridium, "Ir"),
    (Platinum, "Pt"),
    (Gold, "Au"),
    (Mercury, "Hg"),
    (Thallium, "Tl"),
    (Lead, "Pb"),
    (Bismuth, "Bi"),
    (Polonium, "Po"),
    (Astatine, "At"),
    (Radon, "Rn"),
    (Francium, "Fr"),
    (Radium, "Ra"),
    (Actinium, "Ac"),
    (Thorium, "Th"),
    (Protactinium, "Pa"),
    (Uranium, "U"),
    (Neptunium, "Np"),
    (Plutonium, "Pu"),
    (Americium, "Am"),
    (Curium, "Cm"),
    (Berkelium, "Bk"),
    (Californium, "Cf"),
    (Einsteinium, "Es"),
    (Fermium, "Fm"),
    (Mendelevium, "Md"),
    (Nobelium, "No"),
    (Lawrencium, "Lr"),
    (Rutherfordium, "Rf"),
    (Dubnium, "Db"),
    (Seaborgium, "Sg"),
    (Bohrium, "Bh"),
    (Hassium, "Hs"),
    (Meitnerium, "Mt"),
    (Darmstadtium, "Ds"),
    (Roentgenium, "Rg"),
    (Copernicium, "Cn"),
    (Nihonium, "Nh"),
    (Flerovium, "Fl"),
    (Moscovium, "Mc"),
    (Livermorium, "Lv"),
    (Tennessine, "Ts"),
    (Oganesson, "Og"),
);

impl Element {
    /// Return the atomic number of this element (H = 1).
    pub fn atomic_number(&self) -> u8 {
        *self as u8 + 1
    }
}

/// The nodes of a [`Molecule`] graph.
///
/// Besides its element an atom carries the local properties the invariant
/// generators read: formal charge, implicit hydrogen count, isotope mass
/// number and an aromaticity flag.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom {
    element: Element,
    charge: i8,
    hydrogens: u8,
    mass: Option<u16>,
    aromatic: bool,
}

impl Atom {
    /// Construct a neutral, non-aromatic [`Atom`] of type `element` without
    /// implicit hydrogens.
    pub fn new(element: Element) -> Self {
        Self {
            element,
            charge: 0,
            hydrogens: 0,
            mass: None,
            aromatic: false,
        }
    }

    pub fn with_charge(mut self, charge: i8) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_hydrogens(mut self, hydrogens: u8) -> Self {
        self.hydrogens = hydrogens;
        self
    }

    pub fn with_mass(mut self, mass: u16) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn with_aromatic(mut self, aromatic: bool) -> Self {
        self.aromatic = aromatic;
        self
    }

    /// Return this [`Atom`]'s element.
    pub fn element(&self) -> Element {
        self.element
    }

    pub fn charge(&self) -> i8 {
        self.charge
    }

    /// Number of implicit (suppressed) hydrogens on this atom.
    pub fn hydrogens(&self) -> u8 {
        self.hydrogens
    }

    /// Isotope mass number, if one was specified.
    pub fn mass(&self) -> Option<u16> {
        self.mass
    }

    pub fn is_aromatic(&self) -> bool {
        self.aromatic
    }

    pub fn is_hydrogen(&self) -> bool {
        self.element == Element::Hydrogen
    }
}

/// The edges of a [`Molecule`] graph.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Bond {
    Single,
    Double,
    Triple,
    Aromatic,
}

impl Bond {
    /// Bond order doubled so that aromatic bonds (order 1.5) stay integral.
    pub fn doubled_order(&self) -> u64 {
        match self {
            Bond::Single => 2,
            Bond::Aromatic => 3,
            Bond::Double => 4,
            Bond::Triple => 6,
        }
    }
}

/// Thrown by [`Bond::try_from`] when given anything other than 1, 2, 3 or 4.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
#[error("invalid bond order {0}")]
pub struct ParseBondError(pub usize);

impl TryFrom<usize> for Bond {
    type Error = ParseBondError;
    fn try_from(value: usize) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Bond::Single),
            2 => Ok(Bond::Double),
            3 => Ok(Bond::Triple),
            4 => Ok(Bond::Aromatic),
            _ => Err(ParseBondError(value)),
        }
    }
}

/// Thrown when a bond would break the simple-graph invariants of a
/// [`Molecule`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, Error)]
pub enum MoleculeError {
    #[error("atom index {index} is out of range for a molecule with {count} atoms")]
    AtomOutOfRange { index: usize, count: usize },
    #[error("atom {0} cannot be bonded to itself")]
    SelfLoop(usize),
    #[error("atoms {0} and {1} are already bonded")]
    DuplicateBond(usize, usize),
}

/// A simple, loopless graph with [`Atom`]s as nodes and [`Bond`]s as edges.
///
/// Hydrogens may be present either as explicit atoms or as implicit counts
/// on their parent atom; the canonicalization algorithms treat both
/// notations alike for the heavy-atom skeleton.
#[derive(Debug, Clone, Default)]
pub struct Molecule {
    graph: MGraph,
}

impl Molecule {
    /// Construct an empty [`Molecule`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a pretty-printable representation of this molecule.
    pub fn info(&self) -> String {
        let dot = Dot::new(&self.graph);
        format!("{dot:?}")
    }

    pub fn atom_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn bond_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Append `atom` and return its index.
    pub fn add_atom(&mut self, atom: Atom) -> usize {
        self.graph.add_node(atom).index()
    }

    /// Bond atoms `u` and `v`, rejecting self-loops, parallel bonds and
    /// indices that do not name an atom.
    pub fn add_bond(&mut self, u: usize, v: usize, bond: Bond) -> Result<(), MoleculeError> {
        let count = self.atom_count();
        for index in [u, v] {
            if index >= count {
                return Err(MoleculeError::AtomOutOfRange { index, count });
            }
        }
        if u == v {
            return Err(MoleculeError::SelfLoop(u));
        }
        let (a, b) = (NodeIndex::new(u), NodeIndex::new(v));
        if self.graph.find_edge(a, b).is_some() {
            return Err(MoleculeError::DuplicateBond(u, v));
        }
        self.graph.add_edge(a, b, bond);
        Ok(())
    }

    /// Return the atom at index `v`.
    ///
    /// # Panics
    /// If `v` is not an atom index of this molecule.
    pub fn atom(&self, v: usize) -> &Atom {
        &self.graph[NodeIndex::new(v)]
    }

    /// Return an iterator over all atoms in index order.
    pub fn atoms(&self) -> impl Iterator<Item = &Atom> + '_ {
        self.graph.node_weights()
    }

    /// Return the bond between `u` and `v`, if any.
    pub fn bond(&self, u: usize, v: usize) -> Option<Bond> {
        self.graph
            .find_edge(NodeIndex::new(u), NodeIndex::new(v))
            .map(|e| self.graph[e])
    }

    /// Return all bonds as `(u, v, bond)` with `u < v`, sorted.
    pub fn bonds(&self) -> Vec<(usize, usize, Bond)> {
        let mut bonds: Vec<_> = self
            .graph
            .edge_references()
            .map(|e| {
                let (u, v) = (e.source().index(), e.target().index());
                (u.min(v), u.max(v), *e.weight())
            })
            .collect();
        bonds.sort();
        bonds
    }

    /// Return the adjacency lists of this molecule: entry `v` holds the
    /// indices of the atoms bonded to `v` in ascending order.
    pub fn adjacency(&self) -> Vec<Vec<usize>> {
        self.graph
            .node_indices()
            .map(|v| {
                let mut ws: Vec<usize> = self.graph.neighbors(v).map(|w| w.index()).collect();
                ws.sort_unstable();
                ws
            })
            .collect()
    }

    /// Return a copy of this molecule in which atom `v` is moved to index
    /// `perm[v]`.
    ///
    /// # Panics
    /// If `perm` is not a permutation of `0..atom_count()`.
    pub fn permute(&self, perm: &[usize]) -> Molecule {
        let n = self.atom_count();
        assert_eq!(perm.len(), n, "permutation length must equal the atom count");
        let mut inverse = vec![usize::MAX; n];
        for (v, &p) in perm.iter().enumerate() {
            assert!(p < n && inverse[p] == usize::MAX, "not a permutation: {perm:?}");
            inverse[p] = v;
        }

        let mut graph = MGraph::with_capacity(n, self.bond_count());
        for &v in &inverse {
            graph.add_node(*self.atom(v));
        }
        for e in self.graph.edge_references() {
            graph.add_edge(
                NodeIndex::new(perm[e.source().index()]),
                NodeIndex::new(perm[e.target().index()]),
                *e.weight(),
            );
        }
        Molecule { graph }
    }
}

/// Two molecules are equal when they have the same atoms at the same indices
/// and the same bonds, regardless of bond insertion order.
impl PartialEq for Molecule {
    fn eq(&self, other: &Self) -> bool {
        self.atoms().eq(other.atoms()) && self.bonds() == other.bonds()
    }
}

impl Eq for Molecule {}
