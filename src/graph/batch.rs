//! Batched graph data: flat feature tensors plus connectivity and per-graph
//! membership counts.

use crate::errors::GraphError;
use burn::tensor::{Tensor, backend::Backend};

/// A batch of graphs held as flat tensors.
///
/// Feature rows for every edge, node, and graph in the batch are stacked into
/// three 2-d tensors. `senders`/`receivers` index into the node rows, one
/// entry per edge; `n_node`/`n_edge` hold the per-graph counts that delimit
/// each graph's segment of the flat rows. Values are immutable: update
/// blocks produce a fresh batch via [`GraphBatch::with_features`] and never
/// touch the topology.
#[derive(Debug, Clone)]
pub struct GraphBatch<B: Backend> {
    edges: Tensor<B, 2>,
    nodes: Tensor<B, 2>,
    globals: Tensor<B, 2>,
    senders: Vec<usize>,
    receivers: Vec<usize>,
    n_node: Vec<usize>,
    n_edge: Vec<usize>,
}

impl<B: Backend> GraphBatch<B> {
    /// Builds a batch, validating every structural invariant.
    ///
    /// Fails fast with the offending counts or index when the arrays
    /// disagree, when a count does not match its tensor's rows, or when an
    /// edge endpoint does not resolve to a node of the edge's own graph.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        edges: Tensor<B, 2>,
        nodes: Tensor<B, 2>,
        globals: Tensor<B, 2>,
        senders: Vec<usize>,
        receivers: Vec<usize>,
        n_node: Vec<usize>,
        n_edge: Vec<usize>,
    ) -> Result<Self, GraphError> {
        if n_node.len() != n_edge.len() {
            return Err(GraphError::GraphCountMismatch {
                n_node: n_node.len(),
                n_edge: n_edge.len(),
            });
        }

        let [num_edges, _] = edges.dims();
        let [num_nodes, _] = nodes.dims();
        let [num_globals, _] = globals.dims();

        if senders.len() != num_edges || receivers.len() != num_edges {
            return Err(GraphError::EdgeArraysMismatch {
                edges: num_edges,
                senders: senders.len(),
                receivers: receivers.len(),
            });
        }
        let total_edges: usize = n_edge.iter().sum();
        if total_edges != num_edges {
            return Err(GraphError::EdgeCountMismatch {
                expected: total_edges,
                actual: num_edges,
            });
        }
        let total_nodes: usize = n_node.iter().sum();
        if total_nodes != num_nodes {
            return Err(GraphError::NodeCountMismatch {
                expected: total_nodes,
                actual: num_nodes,
            });
        }
        if num_globals != n_node.len() {
            return Err(GraphError::GlobalCountMismatch {
                graphs: n_node.len(),
                actual: num_globals,
            });
        }

        // Every endpoint must land inside its own graph's node segment.
        let mut node_start = 0;
        let mut edge = 0;
        for (graph, (&graph_nodes, &graph_edges)) in
            n_node.iter().zip(n_edge.iter()).enumerate()
        {
            let node_end = node_start + graph_nodes;
            for _ in 0..graph_edges {
                for endpoint in [senders[edge], receivers[edge]] {
                    if endpoint < node_start || endpoint >= node_end {
                        return Err(GraphError::EndpointOutOfRange {
                            edge,
                            node: endpoint,
                            graph,
                            start: node_start,
                            end: node_end,
                        });
                    }
                }
                edge += 1;
            }
            node_start = node_end;
        }

        Ok(Self {
            edges,
            nodes,
            globals,
            senders,
            receivers,
            n_node,
            n_edge,
        })
    }

    /// Rebuilds the batch with replaced feature tensors over the same
    /// topology. Row counts must match the existing entity counts.
    pub fn with_features(
        &self,
        edges: Tensor<B, 2>,
        nodes: Tensor<B, 2>,
        globals: Tensor<B, 2>,
    ) -> Result<Self, GraphError> {
        if edges.dims()[0] != self.num_edges() {
            return Err(GraphError::EdgeCountMismatch {
                expected: self.num_edges(),
                actual: edges.dims()[0],
            });
        }
        if nodes.dims()[0] != self.num_nodes() {
            return Err(GraphError::NodeCountMismatch {
                expected: self.num_nodes(),
                actual: nodes.dims()[0],
            });
        }
        if globals.dims()[0] != self.num_graphs() {
            return Err(GraphError::GlobalCountMismatch {
                graphs: self.num_graphs(),
                actual: globals.dims()[0],
            });
        }

        Ok(Self {
            edges,
            nodes,
            globals,
            senders: self.senders.clone(),
            receivers: self.receivers.clone(),
            n_node: self.n_node.clone(),
            n_edge: self.n_edge.clone(),
        })
    }

    /// Two batches share topology when connectivity and per-graph counts are
    /// identical.
    pub fn same_topology(&self, other: &Self) -> bool {
        self.senders == other.senders
            && self.receivers == other.receivers
            && self.n_node == other.n_node
            && self.n_edge == other.n_edge
    }

    /// Concatenates feature vectors position-wise with another batch of the
    /// same topology, widening every entity's features.
    pub fn concat_features(&self, other: &Self) -> Result<Self, GraphError> {
        if !self.same_topology(other) {
            return Err(GraphError::TopologyMismatch);
        }

        self.with_features(
            Tensor::cat(vec![self.edges.clone(), other.edges.clone()], 1),
            Tensor::cat(vec![self.nodes.clone(), other.nodes.clone()], 1),
            Tensor::cat(vec![self.globals.clone(), other.globals.clone()], 1),
        )
    }

    /// Concatenates independent batches into one, offsetting each batch's
    /// edge endpoints past the nodes that precede it.
    pub fn merge(batches: &[Self]) -> Result<Self, GraphError> {
        let first = batches.first().ok_or(GraphError::EmptyMerge)?;

        let mut edges = Vec::with_capacity(batches.len());
        let mut nodes = Vec::with_capacity(batches.len());
        let mut globals = Vec::with_capacity(batches.len());
        let mut senders = Vec::new();
        let mut receivers = Vec::new();
        let mut n_node = Vec::new();
        let mut n_edge = Vec::new();
        let mut node_offset = 0;

        for batch in batches {
            if batch.edge_size() != first.edge_size() {
                return Err(GraphError::ShapeMismatch {
                    expected: first.edge_size(),
                    actual: batch.edge_size(),
                });
            }
            if batch.node_size() != first.node_size() {
                return Err(GraphError::ShapeMismatch {
                    expected: first.node_size(),
                    actual: batch.node_size(),
                });
            }
            if batch.global_size() != first.global_size() {
                return Err(GraphError::ShapeMismatch {
                    expected: first.global_size(),
                    actual: batch.global_size(),
                });
            }

            senders.extend(batch.senders.iter().map(|&s| s + node_offset));
            receivers.extend(batch.receivers.iter().map(|&r| r + node_offset));
            n_node.extend_from_slice(&batch.n_node);
            n_edge.extend_from_slice(&batch.n_edge);
            node_offset += batch.num_nodes();

            edges.push(batch.edges.clone());
            nodes.push(batch.nodes.clone());
            globals.push(batch.globals.clone());
        }

        Self::new(
            Tensor::cat(edges, 0),
            Tensor::cat(nodes, 0),
            Tensor::cat(globals, 0),
            senders,
            receivers,
            n_node,
            n_edge,
        )
    }

    /// Expands `n_node` into one graph index per node row.
    pub fn node_graph_indices(&self) -> Vec<usize> {
        expand_counts(&self.n_node)
    }

    /// Expands `n_edge` into one graph index per edge row.
    pub fn edge_graph_indices(&self) -> Vec<usize> {
        expand_counts(&self.n_edge)
    }

    /// Edge feature rows, `[num_edges, edge_size]`.
    pub fn edges(&self) -> &Tensor<B, 2> {
        &self.edges
    }

    /// Node feature rows, `[num_nodes, node_size]`.
    pub fn nodes(&self) -> &Tensor<B, 2> {
        &self.nodes
    }

    /// Global feature rows, one per graph, `[num_graphs, global_size]`.
    pub fn globals(&self) -> &Tensor<B, 2> {
        &self.globals
    }

    /// Source node index of each edge.
    pub fn senders(&self) -> &[usize] {
        &self.senders
    }

    /// Destination node index of each edge.
    pub fn receivers(&self) -> &[usize] {
        &self.receivers
    }

    /// Per-graph node counts.
    pub fn n_node(&self) -> &[usize] {
        &self.n_node
    }

    /// Per-graph edge counts.
    pub fn n_edge(&self) -> &[usize] {
        &self.n_edge
    }

    /// Number of graphs in the batch.
    pub fn num_graphs(&self) -> usize {
        self.n_node.len()
    }

    /// Total node rows across the batch.
    pub fn num_nodes(&self) -> usize {
        self.nodes.dims()[0]
    }

    /// Total edge rows across the batch.
    pub fn num_edges(&self) -> usize {
        self.edges.dims()[0]
    }

    /// Edge feature width.
    pub fn edge_size(&self) -> usize {
        self.edges.dims()[1]
    }

    /// Node feature width.
    pub fn node_size(&self) -> usize {
        self.nodes.dims()[1]
    }

    /// Global feature width.
    pub fn global_size(&self) -> usize {
        self.globals.dims()[1]
    }

    /// Device the feature tensors live on.
    pub fn device(&self) -> B::Device {
        self.nodes.device()
    }
}

fn expand_counts(counts: &[usize]) -> Vec<usize> {
    let mut indices = Vec::with_capacity(counts.iter().sum());
    for (graph, &count) in counts.iter().enumerate() {
        indices.extend(std::iter::repeat(graph).take(count));
    }
    indices
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn device() -> <TestBackend as Backend>::Device {
        <TestBackend as Backend>::Device::default()
    }

    /// Two graphs: a 3-node chain with 2 edges and a 2-node pair with 1 edge.
    fn two_graphs() -> GraphBatch<TestBackend> {
        let device = device();
        GraphBatch::new(
            Tensor::ones([3, 2], &device),
            Tensor::ones([5, 3], &device),
            Tensor::ones([2, 4], &device),
            vec![0, 1, 3],
            vec![1, 2, 4],
            vec![3, 2],
            vec![2, 1],
        )
        .expect("batch construction should succeed")
    }

    #[test]
    fn test_valid_batch_accessors() {
        let batch = two_graphs();

        assert_eq!(batch.num_graphs(), 2);
        assert_eq!(batch.num_nodes(), 5);
        assert_eq!(batch.num_edges(), 3);
        assert_eq!(batch.edge_size(), 2);
        assert_eq!(batch.node_size(), 3);
        assert_eq!(batch.global_size(), 4);
        assert_eq!(batch.senders(), &[0, 1, 3]);
        assert_eq!(batch.receivers(), &[1, 2, 4]);
    }

    #[test]
    fn test_graph_membership_expansion() {
        let batch = two_graphs();

        assert_eq!(batch.node_graph_indices(), vec![0, 0, 0, 1, 1]);
        assert_eq!(batch.edge_graph_indices(), vec![0, 0, 1]);
    }

    #[test]
    fn test_graph_count_mismatch() {
        let device = device();
        let result = GraphBatch::<TestBackend>::new(
            Tensor::ones([1, 1], &device),
            Tensor::ones([2, 1], &device),
            Tensor::ones([1, 1], &device),
            vec![0],
            vec![1],
            vec![2],
            vec![1, 0],
        );

        assert!(matches!(
            result,
            Err(GraphError::GraphCountMismatch { n_node: 1, n_edge: 2 })
        ));
    }

    #[test]
    fn test_edge_arrays_mismatch() {
        let device = device();
        let result = GraphBatch::<TestBackend>::new(
            Tensor::ones([2, 1], &device),
            Tensor::ones([2, 1], &device),
            Tensor::ones([1, 1], &device),
            vec![0],
            vec![1, 1],
            vec![2],
            vec![2],
        );

        assert!(matches!(
            result,
            Err(GraphError::EdgeArraysMismatch {
                edges: 2,
                senders: 1,
                receivers: 2
            })
        ));
    }

    #[test]
    fn test_node_count_mismatch() {
        let device = device();
        let result = GraphBatch::<TestBackend>::new(
            Tensor::ones([1, 1], &device),
            Tensor::ones([2, 1], &device),
            Tensor::ones([1, 1], &device),
            vec![0],
            vec![1],
            vec![3],
            vec![1],
        );

        assert!(matches!(
            result,
            Err(GraphError::NodeCountMismatch {
                expected: 3,
                actual: 2
            })
        ));
    }

    #[test]
    fn test_global_count_mismatch() {
        let device = device();
        let result = GraphBatch::<TestBackend>::new(
            Tensor::ones([1, 1], &device),
            Tensor::ones([2, 1], &device),
            Tensor::ones([2, 1], &device),
            vec![0],
            vec![1],
            vec![2],
            vec![1],
        );

        assert!(matches!(
            result,
            Err(GraphError::GlobalCountMismatch { graphs: 1, actual: 2 })
        ));
    }

    #[test]
    fn test_cross_graph_endpoint_rejected() {
        let device = device();
        // Edge 1 belongs to graph 1 but points back at node 0 of graph 0.
        let result = GraphBatch::<TestBackend>::new(
            Tensor::ones([2, 1], &device),
            Tensor::ones([4, 1], &device),
            Tensor::ones([2, 1], &device),
            vec![0, 0],
            vec![1, 3],
            vec![2, 2],
            vec![1, 1],
        );

        assert!(matches!(
            result,
            Err(GraphError::EndpointOutOfRange {
                edge: 1,
                node: 0,
                graph: 1,
                start: 2,
                end: 4
            })
        ));
    }

    #[test]
    fn test_out_of_range_endpoint_rejected() {
        let device = device();
        let result = GraphBatch::<TestBackend>::new(
            Tensor::ones([1, 1], &device),
            Tensor::ones([2, 1], &device),
            Tensor::ones([1, 1], &device),
            vec![0],
            vec![5],
            vec![2],
            vec![1],
        );

        assert!(matches!(
            result,
            Err(GraphError::EndpointOutOfRange { node: 5, .. })
        ));
    }

    #[test]
    fn test_with_features_keeps_topology() {
        let device = device();
        let batch = two_graphs();

        let updated = batch
            .with_features(
                Tensor::zeros([3, 7], &device),
                Tensor::zeros([5, 7], &device),
                Tensor::zeros([2, 7], &device),
            )
            .expect("feature replacement should succeed");

        assert!(batch.same_topology(&updated));
        assert_eq!(updated.edge_size(), 7);
    }

    #[test]
    fn test_with_features_row_mismatch() {
        let device = device();
        let batch = two_graphs();

        let result = batch.with_features(
            Tensor::zeros([4, 7], &device),
            Tensor::zeros([5, 7], &device),
            Tensor::zeros([2, 7], &device),
        );

        assert!(matches!(
            result,
            Err(GraphError::EdgeCountMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }

    #[test]
    fn test_concat_features_doubles_widths() {
        let batch = two_graphs();

        let wide = batch
            .concat_features(&batch)
            .expect("concat should succeed");

        assert!(batch.same_topology(&wide));
        assert_eq!(wide.edge_size(), 4);
        assert_eq!(wide.node_size(), 6);
        assert_eq!(wide.global_size(), 8);
    }

    #[test]
    fn test_concat_features_requires_shared_topology() {
        let device = device();
        let batch = two_graphs();
        let other = GraphBatch::<TestBackend>::new(
            Tensor::ones([1, 2], &device),
            Tensor::ones([2, 3], &device),
            Tensor::ones([1, 4], &device),
            vec![0],
            vec![1],
            vec![2],
            vec![1],
        )
        .expect("batch construction should succeed");

        let result = batch.concat_features(&other);

        assert!(matches!(result, Err(GraphError::TopologyMismatch)));
    }

    #[test]
    fn test_merge_offsets_endpoints() {
        let device = device();
        let a = GraphBatch::<TestBackend>::new(
            Tensor::ones([2, 1], &device),
            Tensor::ones([3, 1], &device),
            Tensor::ones([1, 1], &device),
            vec![0, 1],
            vec![1, 2],
            vec![3],
            vec![2],
        )
        .expect("batch construction should succeed");
        let b = GraphBatch::<TestBackend>::new(
            Tensor::ones([1, 1], &device),
            Tensor::ones([2, 1], &device),
            Tensor::ones([1, 1], &device),
            vec![0],
            vec![1],
            vec![2],
            vec![1],
        )
        .expect("batch construction should succeed");

        let merged = GraphBatch::merge(&[a, b]).expect("merge should succeed");

        assert_eq!(merged.num_graphs(), 2);
        assert_eq!(merged.num_nodes(), 5);
        assert_eq!(merged.senders(), &[0, 1, 3]);
        assert_eq!(merged.receivers(), &[1, 2, 4]);
        assert_eq!(merged.n_node(), &[3, 2]);
        assert_eq!(merged.n_edge(), &[2, 1]);
    }

    #[test]
    fn test_merge_empty_list_errors() {
        let result = GraphBatch::<TestBackend>::merge(&[]);

        assert!(matches!(result, Err(GraphError::EmptyMerge)));
    }

    #[test]
    fn test_merge_width_mismatch_errors() {
        let device = device();
        let a = GraphBatch::<TestBackend>::new(
            Tensor::ones([0, 1], &device),
            Tensor::ones([1, 2], &device),
            Tensor::ones([1, 1], &device),
            vec![],
            vec![],
            vec![1],
            vec![0],
        )
        .expect("batch construction should succeed");
        let b = GraphBatch::<TestBackend>::new(
            Tensor::ones([0, 1], &device),
            Tensor::ones([1, 3], &device),
            Tensor::ones([1, 1], &device),
            vec![],
            vec![],
            vec![1],
            vec![0],
        )
        .expect("batch construction should succeed");

        let result = GraphBatch::merge(&[a, b]);

        assert!(matches!(
            result,
            Err(GraphError::ShapeMismatch {
                expected: 2,
                actual: 3
            })
        ));
    }
}
