//! Graph- and model-related error types.

use thiserror::Error;

/// Errors that can occur while building models or evaluating graph batches.
///
/// All of these are fatal for the evaluation that raised them: the engine is
/// deterministic, so retrying with the same batch and parameters cannot
/// succeed. Variants carry the offending counts or indices so a malformed
/// batch can be diagnosed at the call site.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("feature transform has no layers defined")]
    NoLayers,

    #[error("invalid layer configuration: {message}")]
    InvalidLayerConfig { message: String },

    #[error("shape mismatch: expected {expected} input features, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("edge arrays disagree: {edges} edge rows, {senders} senders, {receivers} receivers")]
    EdgeArraysMismatch {
        edges: usize,
        senders: usize,
        receivers: usize,
    },

    #[error("edge count mismatch: n_edge sums to {expected}, edges tensor has {actual} rows")]
    EdgeCountMismatch { expected: usize, actual: usize },

    #[error("node count mismatch: n_node sums to {expected}, nodes tensor has {actual} rows")]
    NodeCountMismatch { expected: usize, actual: usize },

    #[error("global count mismatch: batch holds {graphs} graphs, globals tensor has {actual} rows")]
    GlobalCountMismatch { graphs: usize, actual: usize },

    #[error("graph count mismatch: n_node has {n_node} entries, n_edge has {n_edge}")]
    GraphCountMismatch { n_node: usize, n_edge: usize },

    #[error("edge {edge} endpoint {node} falls outside graph {graph} (nodes {start}..{end})")]
    EndpointOutOfRange {
        edge: usize,
        node: usize,
        graph: usize,
        start: usize,
        end: usize,
    },

    #[error("graph batches do not share topology")]
    TopologyMismatch,

    #[error("cannot merge an empty list of graph batches")]
    EmptyMerge,

    #[error("at least one processing step is required to produce a prediction")]
    NoProcessingSteps,
}
