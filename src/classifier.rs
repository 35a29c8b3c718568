//! Encode-process-decode classifier producing one score per graph per
//! processing step.

use crate::errors::GraphError;
use crate::graph::{
    GraphBatch, GraphIndependent, GraphIndependentConfig, GraphNetwork, GraphNetworkConfig,
};
use crate::layers::{Activation, MlpBlockConfig};
use burn::{
    module::Module,
    tensor::{Tensor, backend::Backend},
};

/// Configuration for building a [`GraphClassifier`].
#[derive(Debug, Clone)]
pub struct GraphClassifierConfig {
    /// Width of the raw edge feature vectors.
    pub edge_input_size: usize,
    /// Width of the raw node feature vectors.
    pub node_input_size: usize,
    /// Width of the raw global feature vectors.
    pub global_input_size: usize,
    /// Width of the shared latent space.
    pub latent_size: usize,
    /// Dense layers per feature transform.
    pub num_layers: usize,
    /// Width of the per-graph output (1 for a scalar score).
    pub global_output_size: usize,
}

impl GraphClassifierConfig {
    /// Creates a configuration for the given raw input widths.
    pub fn new(edge_input_size: usize, node_input_size: usize, global_input_size: usize) -> Self {
        Self {
            edge_input_size,
            node_input_size,
            global_input_size,
            latent_size: 16,
            num_layers: 2,
            global_output_size: 1,
        }
    }

    /// Sets the latent width.
    pub fn latent_size(mut self, latent_size: usize) -> Self {
        self.latent_size = latent_size;
        self
    }

    /// Sets the number of dense layers per feature transform.
    pub fn num_layers(mut self, num_layers: usize) -> Self {
        self.num_layers = num_layers;
        self
    }

    /// Sets the width of the per-graph output.
    pub fn global_output_size(mut self, global_output_size: usize) -> Self {
        self.global_output_size = global_output_size;
        self
    }

    /// Builds the classifier with the given device.
    pub fn build<B: Backend>(&self, device: &B::Device) -> Result<GraphClassifier<B>, GraphError> {
        if self.latent_size == 0 {
            return Err(GraphError::InvalidLayerConfig {
                message: "latent size must be at least 1".to_string(),
            });
        }
        if self.num_layers == 0 {
            return Err(GraphError::InvalidLayerConfig {
                message: "each feature transform needs at least one layer".to_string(),
            });
        }
        if self.global_output_size == 0 {
            return Err(GraphError::InvalidLayerConfig {
                message: "global output size must be at least 1".to_string(),
            });
        }

        let encoder = GraphIndependentConfig::latent(
            self.edge_input_size,
            self.node_input_size,
            self.global_input_size,
            self.latent_size,
            self.num_layers,
        )
        .init(device)?;

        // The core consumes the encoded input concatenated onto the current
        // latent, so every entity arrives at twice the latent width.
        let core = GraphNetworkConfig::new(
            2 * self.latent_size,
            2 * self.latent_size,
            2 * self.latent_size,
        )
        .latent_size(self.latent_size)
        .num_layers(self.num_layers)
        .init(device)?;

        let decoder = GraphIndependentConfig::latent(
            self.latent_size,
            self.latent_size,
            self.latent_size,
            self.latent_size,
            self.num_layers,
        )
        .init(device)?;

        // Per-graph score head: global transform only, no normalization,
        // sigmoid on the way out.
        let output_transform = GraphIndependentConfig::new()
            .global_block(
                MlpBlockConfig::new(self.latent_size)
                    .dense(self.latent_size, Activation::Relu)
                    .dense(self.global_output_size, Activation::Sigmoid),
            )
            .init(device)?;

        log::debug!(
            "built graph classifier: inputs edge={} node={} global={}, latent={}, layers={}, output={}",
            self.edge_input_size,
            self.node_input_size,
            self.global_input_size,
            self.latent_size,
            self.num_layers,
            self.global_output_size
        );

        Ok(GraphClassifier {
            encoder,
            core,
            decoder,
            output_transform,
        })
    }
}

/// Encode-process-decode graph network.
///
/// An encoder lifts raw features into a shared latent space, a single
/// [`GraphNetwork`] core refines the latents over repeated steps (the same
/// parameters every step), and each step's latents are decoded and projected
/// to one sigmoid score per graph.
#[derive(Module, Debug)]
pub struct GraphClassifier<B: Backend> {
    encoder: GraphIndependent<B>,
    core: GraphNetwork<B>,
    decoder: GraphIndependent<B>,
    output_transform: GraphIndependent<B>,
}

impl<B: Backend> GraphClassifier<B> {
    /// Runs the pipeline for `num_processing_steps` steps and returns every
    /// step's per-graph predictions, in order.
    ///
    /// The encoded input is re-injected ahead of each core step by
    /// concatenating it onto the current latent, which keeps later steps
    /// anchored to the original representation instead of drifting. Zero
    /// steps is legal and yields an empty sequence. Each returned tensor is
    /// `[num_graphs, global_output_size]` with entries in the open interval
    /// (0, 1).
    pub fn forward(
        &self,
        batch: &GraphBatch<B>,
        num_processing_steps: usize,
    ) -> Result<Vec<Tensor<B, 2>>, GraphError> {
        let latent0 = self.encoder.forward(batch)?;
        let mut latent = latent0.clone();

        let mut outputs = Vec::with_capacity(num_processing_steps);
        for _ in 0..num_processing_steps {
            let core_input = latent0.concat_features(&latent)?;
            latent = self.core.forward(&core_input)?;

            let decoded = self.decoder.forward(&latent)?;
            let scored = self.output_transform.forward(&decoded)?;
            outputs.push(scored.globals().clone());
        }
        Ok(outputs)
    }

    /// Runs the pipeline and returns only the final step's predictions.
    ///
    /// Which steps to supervise or consume is a caller decision; this is the
    /// common inference path for callers that only want the most refined
    /// score.
    pub fn predict(
        &self,
        batch: &GraphBatch<B>,
        num_processing_steps: usize,
    ) -> Result<Tensor<B, 2>, GraphError> {
        self.forward(batch, num_processing_steps)?
            .pop()
            .ok_or(GraphError::NoProcessingSteps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    type TestBackend = NdArray;

    fn chain_batch(device: &<TestBackend as Backend>::Device) -> GraphBatch<TestBackend> {
        GraphBatch::new(
            Tensor::ones([2, 1], device),
            Tensor::ones([3, 1], device),
            Tensor::ones([1, 1], device),
            vec![0, 1],
            vec![1, 2],
            vec![3],
            vec![2],
        )
        .expect("batch construction should succeed")
    }

    #[test]
    fn test_zero_steps_yield_empty_sequence() {
        let device = <TestBackend as Backend>::Device::default();
        let model: GraphClassifier<TestBackend> = GraphClassifierConfig::new(1, 1, 1)
            .latent_size(4)
            .build(&device)
            .expect("model build should succeed");

        let outputs = model
            .forward(&chain_batch(&device), 0)
            .expect("forward should succeed");

        assert!(outputs.is_empty());
    }

    #[test]
    fn test_one_prediction_per_step() {
        let device = <TestBackend as Backend>::Device::default();
        let model: GraphClassifier<TestBackend> = GraphClassifierConfig::new(1, 1, 1)
            .latent_size(4)
            .build(&device)
            .expect("model build should succeed");

        let outputs = model
            .forward(&chain_batch(&device), 3)
            .expect("forward should succeed");

        assert_eq!(outputs.len(), 3);
        for step in outputs {
            assert_eq!(step.dims(), [1, 1]);
        }
    }

    #[test]
    fn test_predict_requires_a_step() {
        let device = <TestBackend as Backend>::Device::default();
        let model: GraphClassifier<TestBackend> = GraphClassifierConfig::new(1, 1, 1)
            .latent_size(4)
            .build(&device)
            .expect("model build should succeed");

        let result = model.predict(&chain_batch(&device), 0);

        assert!(matches!(result, Err(GraphError::NoProcessingSteps)));
    }

    #[test]
    fn test_zero_latent_size_rejected() {
        let device = <TestBackend as Backend>::Device::default();
        let result: Result<GraphClassifier<TestBackend>, _> =
            GraphClassifierConfig::new(1, 1, 1).latent_size(0).build(&device);

        assert!(matches!(result, Err(GraphError::InvalidLayerConfig { .. })));
    }

    #[test]
    fn test_zero_layers_rejected() {
        let device = <TestBackend as Backend>::Device::default();
        let result: Result<GraphClassifier<TestBackend>, _> =
            GraphClassifierConfig::new(1, 1, 1).num_layers(0).build(&device);

        assert!(matches!(result, Err(GraphError::InvalidLayerConfig { .. })));
    }

    #[test]
    fn test_wider_global_output() {
        let device = <TestBackend as Backend>::Device::default();
        let model: GraphClassifier<TestBackend> = GraphClassifierConfig::new(1, 1, 1)
            .latent_size(4)
            .global_output_size(3)
            .build(&device)
            .expect("model build should succeed");

        let outputs = model
            .forward(&chain_batch(&device), 1)
            .expect("forward should succeed");

        assert_eq!(outputs[0].dims(), [1, 3]);
    }
}
