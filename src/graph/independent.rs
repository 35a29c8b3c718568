//! Entity-wise graph updates with no cross-entity communication.

use crate::errors::GraphError;
use crate::graph::GraphBatch;
use crate::layers::{MlpBlock, MlpBlockConfig};
use burn::{module::Module, tensor::backend::Backend};

/// Configuration for a [`GraphIndependent`] block.
///
/// Each entity transform is optional; an absent transform leaves that
/// entity's features untouched.
#[derive(Debug, Clone, Default)]
pub struct GraphIndependentConfig {
    /// Transform for edge features.
    pub edge_block: Option<MlpBlockConfig>,
    /// Transform for node features.
    pub node_block: Option<MlpBlockConfig>,
    /// Transform for global features.
    pub global_block: Option<MlpBlockConfig>,
}

impl GraphIndependentConfig {
    /// Creates a configuration with no transforms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the edge transform.
    pub fn edge_block(mut self, config: MlpBlockConfig) -> Self {
        self.edge_block = Some(config);
        self
    }

    /// Sets the node transform.
    pub fn node_block(mut self, config: MlpBlockConfig) -> Self {
        self.node_block = Some(config);
        self
    }

    /// Sets the global transform.
    pub fn global_block(mut self, config: MlpBlockConfig) -> Self {
        self.global_block = Some(config);
        self
    }

    /// All three transforms mapped onto the shared latent MLP shape.
    pub fn latent(
        edge_input_size: usize,
        node_input_size: usize,
        global_input_size: usize,
        latent_size: usize,
        num_layers: usize,
    ) -> Self {
        Self::new()
            .edge_block(MlpBlockConfig::latent(edge_input_size, latent_size, num_layers))
            .node_block(MlpBlockConfig::latent(node_input_size, latent_size, num_layers))
            .global_block(MlpBlockConfig::latent(
                global_input_size,
                latent_size,
                num_layers,
            ))
    }

    /// Initializes the block with the given device.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<GraphIndependent<B>, GraphError> {
        Ok(GraphIndependent {
            edge_block: self.edge_block.as_ref().map(|c| c.init(device)).transpose()?,
            node_block: self.node_block.as_ref().map(|c| c.init(device)).transpose()?,
            global_block: self
                .global_block
                .as_ref()
                .map(|c| c.init(device))
                .transpose()?,
        })
    }
}

/// Applies per-entity feature transforms independently.
///
/// Connectivity and per-graph counts pass through unchanged, and no
/// information flows between edges, nodes, and globals. Serves as encoder,
/// decoder, and (with only a global transform) output head.
#[derive(Module, Debug)]
pub struct GraphIndependent<B: Backend> {
    edge_block: Option<MlpBlock<B>>,
    node_block: Option<MlpBlock<B>>,
    global_block: Option<MlpBlock<B>>,
}

impl<B: Backend> GraphIndependent<B> {
    /// Transforms each entity's features in place of the old ones, returning
    /// a batch over the same topology.
    pub fn forward(&self, batch: &GraphBatch<B>) -> Result<GraphBatch<B>, GraphError> {
        let edges = match &self.edge_block {
            Some(block) => block.forward(batch.edges().clone())?,
            None => batch.edges().clone(),
        };
        let nodes = match &self.node_block {
            Some(block) => block.forward(batch.nodes().clone())?,
            None => batch.nodes().clone(),
        };
        let globals = match &self.global_block {
            Some(block) => block.forward(batch.globals().clone())?,
            None => batch.globals().clone(),
        };

        batch.with_features(edges, nodes, globals)
    }
}
