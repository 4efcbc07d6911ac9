use crate::error::{Error, Result};

/// Dense `[channels, n, n]` adjacency tensor in row-major order.
#[derive(Debug, Clone, PartialEq)]
pub struct AdjacencyTensor {
    data: Vec<f32>,
    shape: [usize; 3],
}

impl AdjacencyTensor {
    /// Creates an all-zero tensor.
    pub fn zeros(channels: usize, n: usize) -> Self {
        Self {
            data: vec![0.0; channels * n * n],
            shape: [channels, n, n],
        }
    }

    /// Creates a tensor from existing data.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the data length doesn't match
    /// `channels * n * n`.
    pub fn from_vec(data: Vec<f32>, channels: usize, n: usize) -> Result<Self> {
        if data.len() != channels * n * n {
            return Err(Error::invalid_argument(format!(
                "data length {} doesn't match shape [{channels}, {n}, {n}]",
                data.len()
            )));
        }
        Ok(Self {
            data,
            shape: [channels, n, n],
        })
    }

    /// Returns the shape as `[channels, n, n]`.
    pub fn shape(&self) -> [usize; 3] {
        self.shape
    }

    /// Number of channels (edge types).
    pub fn channels(&self) -> usize {
        self.shape[0]
    }

    /// Number of nodes per side.
    pub fn nodes(&self) -> usize {
        self.shape[1]
    }

    /// Returns the underlying data as a slice.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Consumes the tensor and returns the underlying data.
    pub fn into_vec(self) -> Vec<f32> {
        self.data
    }

    fn offset(&self, channel: usize, i: usize, j: usize) -> Option<usize> {
        let [c, n, _] = self.shape;
        (channel < c && i < n && j < n).then(|| (channel * n + i) * n + j)
    }

    /// Gets the value at `(channel, i, j)`.
    pub fn get(&self, channel: usize, i: usize, j: usize) -> Option<f32> {
        self.offset(channel, i, j).map(|o| self.data[o])
    }

    /// Sets the value at `(channel, i, j)`.
    ///
    /// # Panics
    ///
    /// Panics if the indices are out of bounds.
    pub fn set(&mut self, channel: usize, i: usize, j: usize, value: f32) {
        let offset = self.offset(channel, i, j);
        assert!(offset.is_some(), "index ({channel}, {i}, {j}) out of bounds");
        if let Some(o) = offset {
            self.data[o] = value;
        }
    }

    /// Iterates over the non-zero entries as `(channel, i, j)`, in
    /// channel-major order.
    pub fn nonzero(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let [_, n, _] = self.shape;
        self.data
            .iter()
            .enumerate()
            .filter(|(_, &v)| v != 0.0)
            .map(move |(o, _)| (o / (n * n), (o / n) % n, o % n))
    }
}

/// Graph in the padded dense layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PaddingGraphData {
    /// Atomic number per node, zero-padded.
    pub x: Vec<i32>,
    /// `[edge_type, n, n]` adjacency.
    pub adj: AdjacencyTensor,
    /// Graph-level super node features.
    pub super_node: Option<Vec<f32>>,
    /// Node coordinates.
    pub pos: Option<Vec<[f64; 3]>>,
    /// Targets.
    pub y: Option<Vec<f64>>,
}

/// Graph in the sparse edge-list layout.
#[derive(Debug, Clone, PartialEq)]
pub struct SparseGraphData {
    /// Atomic number per node.
    pub x: Vec<i32>,
    /// Source nodes (`edge_index[0]`) and target nodes (`edge_index[1]`).
    pub edge_index: [Vec<usize>; 2],
    /// Edge type of every edge.
    pub edge_attr: Vec<usize>,
    /// Node coordinates.
    pub pos: Option<Vec<[f64; 3]>>,
    /// Graph-level super node features.
    pub super_node: Option<Vec<f32>>,
    /// Targets.
    pub y: Option<Vec<f64>>,
}

impl SparseGraphData {
    /// Number of nodes.
    pub fn num_nodes(&self) -> usize {
        self.x.len()
    }

    /// Number of directed edges.
    pub fn num_edges(&self) -> usize {
        self.edge_attr.len()
    }

    /// Iterates over edges as `(source, target, edge_type)`.
    pub fn edges(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        self.edge_index[0]
            .iter()
            .zip(&self.edge_index[1])
            .zip(&self.edge_attr)
            .map(|((&s, &t), &a)| (s, t, a))
    }
}

/// An ordered collection of sparse graphs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseGraphDataset {
    graphs: Vec<SparseGraphData>,
}

impl SparseGraphDataset {
    /// Wraps a list of graphs.
    pub fn new(graphs: Vec<SparseGraphData>) -> Self {
        Self { graphs }
    }

    /// Number of graphs.
    pub fn len(&self) -> usize {
        self.graphs.len()
    }

    /// Returns true if there are no graphs.
    pub fn is_empty(&self) -> bool {
        self.graphs.is_empty()
    }

    /// Returns the graph at `index`.
    pub fn get(&self, index: usize) -> Option<&SparseGraphData> {
        self.graphs.get(index)
    }

    /// Iterates over the graphs.
    pub fn iter(&self) -> std::slice::Iter<'_, SparseGraphData> {
        self.graphs.iter()
    }

    /// Returns the graphs at `indices`, in that order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if an index is out of bounds.
    pub fn select(&self, indices: &[usize]) -> Result<Self> {
        indices
            .iter()
            .map(|&i| {
                self.graphs.get(i).cloned().ok_or_else(|| {
                    Error::invalid_argument(format!(
                        "graph index {i} out of bounds for {} graphs",
                        self.graphs.len()
                    ))
                })
            })
            .collect::<Result<Vec<_>>>()
            .map(Self::new)
    }
}

impl<'a> IntoIterator for &'a SparseGraphDataset {
    type Item = &'a SparseGraphData;
    type IntoIter = std::slice::Iter<'a, SparseGraphData>;

    fn into_iter(self) -> Self::IntoIter {
        self.graphs.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjacency_zeros_shape() {
        let adj = AdjacencyTensor::zeros(4, 3);
        assert_eq!(adj.shape(), [4, 3, 3]);
        assert_eq!(adj.as_slice().len(), 36);
        assert_eq!(adj.nonzero().count(), 0);
        assert_eq!((adj.channels(), adj.nodes()), (4, 3));
        assert_eq!(adj.into_vec(), vec![0.0; 36]);
    }

    #[test]
    fn test_adjacency_from_vec_checks_length() {
        assert!(AdjacencyTensor::from_vec(vec![0.0; 8], 2, 2).is_ok());
        assert!(AdjacencyTensor::from_vec(vec![0.0; 7], 2, 2).is_err());
    }

    #[test]
    fn test_adjacency_get_set() {
        let mut adj = AdjacencyTensor::zeros(2, 3);
        adj.set(1, 0, 2, 1.0);
        assert_eq!(adj.get(1, 0, 2), Some(1.0));
        assert_eq!(adj.get(0, 0, 2), Some(0.0));
        assert_eq!(adj.get(2, 0, 0), None);
    }

    #[test]
    #[should_panic(expected = "out of bounds")]
    fn test_adjacency_set_out_of_bounds_panics() {
        let mut adj = AdjacencyTensor::zeros(1, 2);
        adj.set(0, 2, 0, 1.0);
    }

    #[test]
    fn test_adjacency_nonzero_order() {
        let mut adj = AdjacencyTensor::zeros(2, 3);
        adj.set(1, 2, 0, 1.0);
        adj.set(0, 1, 2, 1.0);
        let entries: Vec<_> = adj.nonzero().collect();
        assert_eq!(entries, vec![(0, 1, 2), (1, 2, 0)]);
    }

    fn sample_graph() -> SparseGraphData {
        SparseGraphData {
            x: vec![6, 8],
            edge_index: [vec![0, 1], vec![1, 0]],
            edge_attr: vec![1, 1],
            pos: None,
            super_node: None,
            y: Some(vec![0.5]),
        }
    }

    #[test]
    fn test_sparse_graph_counts() {
        let graph = sample_graph();
        assert_eq!(graph.num_nodes(), 2);
        assert_eq!(graph.num_edges(), 2);
        assert_eq!(graph.edges().collect::<Vec<_>>(), vec![(0, 1, 1), (1, 0, 1)]);
    }

    #[test]
    fn test_dataset_select() {
        let mut other = sample_graph();
        other.y = Some(vec![1.5]);
        let dataset = SparseGraphDataset::new(vec![sample_graph(), other]);

        let picked = dataset.select(&[1, 0, 1]).unwrap();
        assert_eq!(picked.len(), 3);
        assert_eq!(picked.get(0).and_then(|g| g.y.clone()), Some(vec![1.5]));
        assert!(dataset.select(&[2]).is_err());
    }

    #[test]
    fn test_dataset_iter() {
        let dataset = SparseGraphDataset::new(vec![sample_graph(); 3]);
        assert_eq!((&dataset).into_iter().count(), 3);
        assert_eq!(dataset.iter().map(SparseGraphData::num_edges).sum::<usize>(), 6);
        assert!(!dataset.is_empty());
    }
}
