//! The message-passing update: edge, node, then global, each stage consuming
//! the output of the one before it.

use crate::errors::GraphError;
use crate::graph::GraphBatch;
use crate::graph::aggregate::{index_tensor, scatter_sum, segment_sum};
use crate::layers::{MlpBlock, MlpBlockConfig};
use burn::{
    module::Module,
    tensor::{Tensor, backend::Backend},
};

/// Configuration for a [`GraphNetwork`] step.
///
/// The three update functions all map onto the latent MLP shape; their input
/// widths are derived from the entity widths and the fixed concatenation
/// recipe of the step, so only the incoming entity widths and the latent
/// geometry need to be given.
#[derive(Debug, Clone)]
pub struct GraphNetworkConfig {
    /// Width of incoming edge features.
    pub edge_input_size: usize,
    /// Width of incoming node features.
    pub node_input_size: usize,
    /// Width of incoming global features.
    pub global_input_size: usize,
    /// Width of the latent space every update lands in.
    pub latent_size: usize,
    /// Dense layers per update function.
    pub num_layers: usize,
}

impl GraphNetworkConfig {
    /// Creates a configuration for the given incoming entity widths.
    pub fn new(edge_input_size: usize, node_input_size: usize, global_input_size: usize) -> Self {
        Self {
            edge_input_size,
            node_input_size,
            global_input_size,
            latent_size: 16,
            num_layers: 2,
        }
    }

    /// Sets the latent width.
    pub fn latent_size(mut self, latent_size: usize) -> Self {
        self.latent_size = latent_size;
        self
    }

    /// Sets the number of dense layers per update function.
    pub fn num_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    /// Initializes the network with the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<GraphNetwork<B>, GraphError> {
        // Edges see both endpoints and their graph's global; nodes see their
        // summed incoming updated edges and the global; globals see the
        // per-graph sums of both updated entities.
        let edge_in = self.edge_input_size + 2 * self.node_input_size + self.global_input_size;
        let node_in = self.node_input_size + self.latent_size + self.global_input_size;
        let global_in = self.global_input_size + 2 * self.latent_size;

        Ok(GraphNetwork {
            edge_block: MlpBlockConfig::latent(edge_in, self.latent_size, self.num_layers)
                .init(device)?,
            node_block: MlpBlockConfig::latent(node_in, self.latent_size, self.num_layers)
                .init(device)?,
            global_block: MlpBlockConfig::latent(global_in, self.latent_size, self.num_layers)
                .init(device)?,
        })
    }
}

/// One full message-passing step over a [`GraphBatch`].
///
/// The update order is a design commitment: the node update consumes the
/// *updated* edges, and the global update consumes the *updated* nodes and
/// edges. Topology is never altered, so the same network can be applied to
/// its own output repeatedly, and one instance reused across steps shares
/// its parameters across all of them.
#[derive(Module, Debug)]
pub struct GraphNetwork<B: Backend> {
    edge_block: MlpBlock<B>,
    node_block: MlpBlock<B>,
    global_block: MlpBlock<B>,
}

impl<B: Backend> GraphNetwork<B> {
    /// Runs one step, returning a batch with the same topology and updated
    /// edge, node, and global features.
    pub fn forward(&self, batch: &GraphBatch<B>) -> Result<GraphBatch<B>, GraphError> {
        let device = batch.device();
        let senders = index_tensor::<B>(batch.senders(), &device);
        let receivers = index_tensor::<B>(batch.receivers(), &device);
        let edge_graphs = index_tensor::<B>(&batch.edge_graph_indices(), &device);
        let node_graphs = index_tensor::<B>(&batch.node_graph_indices(), &device);

        // Edge update: each edge sees its endpoints and its graph's global.
        let collected = Tensor::cat(
            vec![
                batch.edges().clone(),
                batch.nodes().clone().select(0, senders),
                batch.nodes().clone().select(0, receivers),
                batch.globals().clone().select(0, edge_graphs),
            ],
            1,
        );
        let edges = self.edge_block.forward(collected)?;

        // Node update: updated edges are summed per receiving node. Nodes
        // with no incoming edges aggregate to a zero vector.
        let incoming = scatter_sum(edges.clone(), batch.receivers(), batch.num_nodes());
        let collected = Tensor::cat(
            vec![
                batch.nodes().clone(),
                incoming,
                batch.globals().clone().select(0, node_graphs),
            ],
            1,
        );
        let nodes = self.node_block.forward(collected)?;

        // Global update: per-graph sums of the updated nodes and edges.
        let collected = Tensor::cat(
            vec![
                batch.globals().clone(),
                segment_sum(nodes.clone(), batch.n_node()),
                segment_sum(edges.clone(), batch.n_edge()),
            ],
            1,
        );
        let globals = self.global_block.forward(collected)?;

        batch.with_features(edges, nodes, globals)
    }
}
