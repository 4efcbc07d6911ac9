use super::{
    data::{AdjacencyTensor, PaddingGraphData, SparseGraphData, SparseGraphDataset},
    molecule::{BondType, Molecule},
};
use crate::error::{Error, Result};

/// Featurizes molecules into padded atom arrays and discrete edge tensors.
///
/// `max_atoms` rejects larger molecules; `out_size` pads every output to a
/// fixed node count. `None` disables either limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GgnnPreprocessor {
    max_atoms: Option<usize>,
    out_size: Option<usize>,
}

impl GgnnPreprocessor {
    /// Creates a preprocessor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if both limits are set and
    /// `max_atoms > out_size`.
    pub fn new(max_atoms: Option<usize>, out_size: Option<usize>) -> Result<Self> {
        if let (Some(max_atoms), Some(out_size)) = (max_atoms, out_size) {
            if max_atoms > out_size {
                return Err(Error::invalid_argument(format!(
                    "max_atoms {max_atoms} must be less or equal to out_size {out_size}"
                )));
            }
        }
        Ok(Self {
            max_atoms,
            out_size,
        })
    }

    /// Maximum accepted atom count.
    pub fn max_atoms(&self) -> Option<usize> {
        self.max_atoms
    }

    /// Padded output size.
    pub fn out_size(&self) -> Option<usize> {
        self.out_size
    }

    /// Returns the atomic-number array and the `[4, n, n]` edge tensor.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Feature`] if the molecule exceeds `max_atoms` or
    /// `out_size`, or has a bond referencing a missing atom.
    pub fn input_features(&self, mol: &Molecule) -> Result<(Vec<i32>, AdjacencyTensor)> {
        let num_atoms = mol.atom_count();
        if let Some(max_atoms) = self.max_atoms {
            if num_atoms > max_atoms {
                return Err(Error::feature(format!(
                    "number of atoms {num_atoms} exceeds max_atoms {max_atoms}"
                )));
            }
        }
        let n = match self.out_size {
            Some(out_size) if num_atoms > out_size => {
                return Err(Error::feature(format!(
                    "number of atoms {num_atoms} exceeds out_size {out_size}"
                )));
            }
            Some(out_size) => out_size,
            None => num_atoms,
        };

        let mut atoms: Vec<i32> = mol.atoms.iter().map(|&z| i32::from(z)).collect();
        atoms.resize(n, 0);

        let mut adj = AdjacencyTensor::zeros(BondType::COUNT, n);
        for bond in &mol.bonds {
            if bond.j >= num_atoms {
                return Err(Error::feature(format!(
                    "bond ({}, {}) references atom outside a molecule of {num_atoms} atoms",
                    bond.i, bond.j
                )));
            }
            let channel = bond.bond_type.channel();
            adj.set(channel, bond.i, bond.j, 1.0);
            adj.set(channel, bond.j, bond.i, 1.0);
        }
        Ok((atoms, adj))
    }

    /// Featurizes a molecule into the padded graph layout.
    ///
    /// # Errors
    ///
    /// See [`Self::input_features`].
    pub fn padding_graph(&self, mol: &Molecule, y: Option<Vec<f64>>) -> Result<PaddingGraphData> {
        let (x, adj) = self.input_features(mol)?;
        Ok(PaddingGraphData {
            x,
            adj,
            super_node: None,
            pos: None,
            y,
        })
    }
}

/// Featurizes molecules into sparse edge-list graphs for relational GCNs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RelGcnSparsePreprocessor {
    inner: GgnnPreprocessor,
}

impl RelGcnSparsePreprocessor {
    /// Creates a preprocessor with the same limits as [`GgnnPreprocessor`].
    ///
    /// # Errors
    ///
    /// See [`GgnnPreprocessor::new`].
    pub fn new(max_atoms: Option<usize>, out_size: Option<usize>) -> Result<Self> {
        Ok(Self {
            inner: GgnnPreprocessor::new(max_atoms, out_size)?,
        })
    }

    /// The dense featurizer this one builds on.
    pub fn dense(&self) -> &GgnnPreprocessor {
        &self.inner
    }

    /// Converts a dense graph into the sparse layout.
    ///
    /// Every non-zero `adj[t, i, j]` becomes an edge `i -> j` of type `t`,
    /// so an undirected bond yields two edges.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Feature`] if the adjacency tensor is smaller than
    /// the node array.
    pub fn construct_sparse_data(
        &self,
        x: Vec<i32>,
        adj: &AdjacencyTensor,
        y: Option<Vec<f64>>,
    ) -> Result<SparseGraphData> {
        if adj.nodes() < x.len() {
            return Err(Error::feature(format!(
                "adjacency covers {} nodes but {} node features were given",
                adj.nodes(),
                x.len()
            )));
        }

        let mut sources = Vec::new();
        let mut targets = Vec::new();
        let mut edge_attr = Vec::new();
        for (t, i, j) in adj.nonzero() {
            sources.push(i);
            targets.push(j);
            edge_attr.push(t);
        }
        Ok(SparseGraphData {
            x,
            edge_index: [sources, targets],
            edge_attr,
            pos: None,
            super_node: None,
            y,
        })
    }

    /// Featurizes a molecule straight into the sparse layout.
    ///
    /// # Errors
    ///
    /// See [`GgnnPreprocessor::input_features`].
    pub fn sparse_graph(&self, mol: &Molecule, y: Option<Vec<f64>>) -> Result<SparseGraphData> {
        let (x, adj) = self.inner.input_features(mol)?;
        self.construct_sparse_data(x, &adj, y)
    }

    /// Builds a dataset from parallel node, adjacency and target sequences.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the sequences differ in length,
    /// otherwise see [`Self::construct_sparse_data`].
    pub fn create_dataset(
        &self,
        xs: Vec<Vec<i32>>,
        adjs: &[AdjacencyTensor],
        ys: Option<Vec<Vec<f64>>>,
    ) -> Result<SparseGraphDataset> {
        if xs.len() != adjs.len() || ys.as_ref().is_some_and(|ys| ys.len() != xs.len()) {
            return Err(Error::invalid_argument(format!(
                "node, adjacency and target sequences differ in length ({}, {}, {:?})",
                xs.len(),
                adjs.len(),
                ys.as_ref().map(Vec::len)
            )));
        }

        let mut ys = ys.map(Vec::into_iter);
        let graphs = xs
            .into_iter()
            .zip(adjs)
            .map(|(x, adj)| {
                let y = ys.as_mut().and_then(Iterator::next);
                self.construct_sparse_data(x, adj, y)
            })
            .collect::<Result<Vec<_>>>()?;
        log::debug!("built sparse graph dataset of {} graphs", graphs.len());
        Ok(SparseGraphDataset::new(graphs))
    }
}
