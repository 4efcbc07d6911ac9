use std::{fmt, str::FromStr};

use thiserror::Error;

/// Error returned when a bond type string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid bond type string: '{0}'")]
pub struct ParseBondTypeError(String);

/// Chemical bond type; each maps to one adjacency channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BondType {
    /// Single bond, channel 0.
    Single,
    /// Double bond, channel 1.
    Double,
    /// Triple bond, channel 2.
    Triple,
    /// Aromatic bond, channel 3.
    Aromatic,
}

impl BondType {
    /// Number of distinct bond types, i.e. adjacency channels.
    pub const COUNT: usize = 4;

    /// Adjacency channel of this bond type.
    pub fn channel(&self) -> usize {
        match self {
            BondType::Single => 0,
            BondType::Double => 1,
            BondType::Triple => 2,
            BondType::Aromatic => 3,
        }
    }
}

impl fmt::Display for BondType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BondType::Single => write!(f, "Single"),
            BondType::Double => write!(f, "Double"),
            BondType::Triple => write!(f, "Triple"),
            BondType::Aromatic => write!(f, "Aromatic"),
        }
    }
}

impl FromStr for BondType {
    type Err = ParseBondTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "single" | "1" => Ok(BondType::Single),
            "double" | "2" => Ok(BondType::Double),
            "triple" | "3" => Ok(BondType::Triple),
            "aromatic" | "ar" => Ok(BondType::Aromatic),
            _ => Err(ParseBondTypeError(s.to_string())),
        }
    }
}

/// A bond between atoms `i` and `j`, stored with `i <= j`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Bond {
    /// Lower atom index.
    pub i: usize,
    /// Higher atom index.
    pub j: usize,
    /// Bond type.
    pub bond_type: BondType,
}

impl Bond {
    /// Creates a bond, ordering the atom indices.
    pub fn new(idx1: usize, idx2: usize, bond_type: BondType) -> Self {
        if idx1 <= idx2 {
            Self {
                i: idx1,
                j: idx2,
                bond_type,
            }
        } else {
            Self {
                i: idx2,
                j: idx1,
                bond_type,
            }
        }
    }
}

/// A molecule as atomic numbers plus a bond list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Molecule {
    /// Atomic number of every atom.
    pub atoms: Vec<u8>,
    /// Bonds between atoms.
    pub bonds: Vec<Bond>,
}

impl Molecule {
    /// Creates a molecule with no bonds.
    pub fn new(atoms: Vec<u8>) -> Self {
        Self {
            atoms,
            bonds: Vec::new(),
        }
    }

    /// Adds a bond and returns the molecule.
    #[must_use]
    pub fn with_bond(mut self, i: usize, j: usize, bond_type: BondType) -> Self {
        self.bonds.push(Bond::new(i, j, bond_type));
        self
    }

    /// Number of atoms.
    #[inline]
    pub fn atom_count(&self) -> usize {
        self.atoms.len()
    }

    /// Number of bonds.
    #[inline]
    pub fn bond_count(&self) -> usize {
        self.bonds.len()
    }
}
