//! # graphnet
//!
//! Graph-network building blocks on the Burn framework, plus an
//! encode-process-decode classifier that scores each graph in a batch once
//! per processing step.
//!
//! A [`GraphBatch`] holds one or more graphs as flat edge/node/global
//! feature tensors with connectivity indices and per-graph counts. Update
//! blocks transform a batch into a new batch over the same topology:
//! [`graph::GraphIndependent`] applies per-entity feature transforms, while
//! [`graph::GraphNetwork`] runs one full message-passing step. The
//! [`GraphClassifier`] wires them into encoder → repeated core → decoder →
//! per-graph sigmoid score, emitting one prediction per processing step.
//!
//! ## Example
//!
//! ```
//! use graphnet::prelude::*;
//! use burn::backend::NdArray;
//! use burn::tensor::Tensor;
//!
//! type Backend = NdArray;
//!
//! let device = <Backend as burn::tensor::backend::Backend>::Device::default();
//!
//! // One graph: three nodes in a chain, scalar features everywhere.
//! let batch: GraphBatch<Backend> = GraphBatch::new(
//!     Tensor::ones([2, 1], &device),
//!     Tensor::ones([3, 1], &device),
//!     Tensor::ones([1, 1], &device),
//!     vec![0, 1],
//!     vec![1, 2],
//!     vec![3],
//!     vec![2],
//! )
//! .expect("graph invariants hold");
//!
//! let model: GraphClassifier<Backend> = GraphClassifierConfig::new(1, 1, 1)
//!     .latent_size(16)
//!     .build(&device)
//!     .expect("configuration is valid");
//!
//! // Two processing steps produce two per-graph scores, refined in order.
//! let outputs = model.forward(&batch, 2).expect("well-formed batch");
//! assert_eq!(outputs.len(), 2);
//! ```

pub mod classifier;
pub mod errors;
pub mod graph;
pub mod layers;

// Re-exports for convenience
pub use classifier::{GraphClassifier, GraphClassifierConfig};
pub use errors::GraphError;
pub use graph::GraphBatch;
pub use layers::activation::Activation;

/// Backend type alias for WGPU with autodiff support.
pub type Backend = burn::backend::Autodiff<burn::backend::Wgpu>;

/// Backend type for inference (no autodiff).
pub type InferenceBackend = burn::backend::Wgpu;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::classifier::{GraphClassifier, GraphClassifierConfig};
    pub use crate::errors::GraphError;
    pub use crate::graph::{
        GraphBatch, GraphIndependent, GraphIndependentConfig, GraphNetwork, GraphNetworkConfig,
        scatter_sum, segment_sum,
    };
    pub use crate::layers::{Activation, Dense, DenseConfig, MlpBlock, MlpBlockConfig};
    pub use crate::{Backend, InferenceBackend};
}
