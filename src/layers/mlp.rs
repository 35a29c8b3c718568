//! Feed-forward transform blocks: a dense stack followed by optional layer
//! normalization.
//!
//! Every edge, node, and global update function in this crate is an
//! [`MlpBlock`]. Each call to [`MlpBlockConfig::init`] draws a fresh,
//! unshared parameter set; sharing happens only by reusing the initialized
//! block itself.

use crate::errors::GraphError;
use crate::layers::{Activation, Dense, DenseConfig};
use burn::{
    module::Module,
    nn::{LayerNorm, LayerNormConfig},
    tensor::{Tensor, backend::Backend},
};

/// Configuration for an [`MlpBlock`].
#[derive(Debug, Clone)]
pub struct MlpBlockConfig {
    /// Number of input features.
    pub input_size: usize,
    /// Layer configurations, in order.
    pub layer_configs: Vec<DenseConfig>,
    /// Whether to layer-normalize the output features.
    pub layer_norm: bool,
}

impl MlpBlockConfig {
    /// Creates an empty configuration for the given input width.
    pub fn new(input_size: usize) -> Self {
        Self {
            input_size,
            layer_configs: Vec::new(),
            layer_norm: false,
        }
    }

    /// Appends a dense layer; its input size chains from the previous layer.
    pub fn dense(mut self, output_size: usize, activation: Activation) -> Self {
        let input_size = self
            .layer_configs
            .last()
            .map(|config| config.output_size)
            .unwrap_or(self.input_size);

        self.layer_configs
            .push(DenseConfig::new(input_size, output_size).with_activation(activation));
        self
    }

    /// Rescales each output row to zero mean and unit variance, followed by
    /// a learned per-feature scale and shift.
    pub fn with_layer_norm(mut self) -> Self {
        self.layer_norm = true;
        self
    }

    /// The shared latent transform shape: `num_layers` relu-activated dense
    /// layers of width `latent_size` (the final layer included), normalized.
    pub fn latent(input_size: usize, latent_size: usize, num_layers: usize) -> Self {
        let mut config = Self::new(input_size);
        for _ in 0..num_layers {
            config = config.dense(latent_size, Activation::Relu);
        }
        config.with_layer_norm()
    }

    /// Output width of the configured block.
    pub fn output_size(&self) -> usize {
        self.layer_configs
            .last()
            .map(|config| config.output_size)
            .unwrap_or(self.input_size)
    }

    /// Initializes the block with freshly drawn parameters.
    pub fn init<B: Backend>(&self, device: &B::Device) -> Result<MlpBlock<B>, GraphError> {
        if self.layer_configs.is_empty() {
            return Err(GraphError::NoLayers);
        }

        let layers: Vec<Dense<B>> = self
            .layer_configs
            .iter()
            .map(|config| config.init(device))
            .collect();
        let norm = self
            .layer_norm
            .then(|| LayerNormConfig::new(self.output_size()).init(device));

        Ok(MlpBlock {
            layers,
            norm,
            input_size: self.input_size,
            output_size: self.output_size(),
        })
    }
}

/// A feed-forward stack over feature rows, optionally followed by layer
/// normalization.
///
/// Row `i` of the output depends only on row `i` of the input. Deterministic
/// given parameters; parameters are read, never written, during a forward
/// pass.
#[derive(Module, Debug)]
pub struct MlpBlock<B: Backend> {
    layers: Vec<Dense<B>>,
    norm: Option<LayerNorm<B>>,
    input_size: usize,
    output_size: usize,
}

impl<B: Backend> MlpBlock<B> {
    /// Transforms a `[count, input_size]` batch of feature rows.
    pub fn forward(&self, input: Tensor<B, 2>) -> Result<Tensor<B, 2>, GraphError> {
        let [_, width] = input.dims();
        if width != self.input_size {
            return Err(GraphError::ShapeMismatch {
                expected: self.input_size,
                actual: width,
            });
        }

        let mut x = input;
        for layer in &self.layers {
            x = layer.forward(x);
        }
        if let Some(norm) = &self.norm {
            x = norm.forward(x);
        }
        Ok(x)
    }

    /// Returns the expected input width.
    pub fn input_size(&self) -> usize {
        self.input_size
    }

    /// Returns the output width.
    pub fn output_size(&self) -> usize {
        self.output_size
    }
}
