//! Molecular graph records for graph neural network input.
//!
//! Two layouts are supported:
//!
//! - **padded** ([`PaddingGraphData`]): an atomic-number vector and a dense
//!   `[edge_type, n, n]` adjacency tensor, both padded to a fixed size so
//!   that molecules batch into equal shapes;
//! - **sparse** ([`SparseGraphData`]): an edge list (`edge_index`) with one
//!   edge type per edge (`edge_attr`).
//!
//! # Example
//!
//! ```
//! use molsplit::graph::{BondType, GgnnPreprocessor, Molecule, RelGcnSparsePreprocessor};
//!
//! // formaldehyde: C=O plus two hydrogens
//! let mol = Molecule::new(vec![6, 8, 1, 1])
//!     .with_bond(0, 1, BondType::Double)
//!     .with_bond(0, 2, BondType::Single)
//!     .with_bond(0, 3, BondType::Single);
//!
//! let padded = GgnnPreprocessor::new(None, Some(6)).unwrap();
//! let (atoms, adj) = padded.input_features(&mol).unwrap();
//! assert_eq!(atoms, vec![6, 8, 1, 1, 0, 0]);
//! assert_eq!(adj.shape(), [4, 6, 6]);
//!
//! let sparse = RelGcnSparsePreprocessor::new(None, None).unwrap();
//! let graph = sparse.sparse_graph(&mol, None).unwrap();
//! assert_eq!(graph.num_edges(), 6);
//! ```

mod data;
mod molecule;
mod preprocess;

pub use data::{AdjacencyTensor, PaddingGraphData, SparseGraphData, SparseGraphDataset};
pub use molecule::{Bond, BondType, Molecule, ParseBondTypeError};
pub use preprocess::{GgnnPreprocessor, RelGcnSparsePreprocessor};
