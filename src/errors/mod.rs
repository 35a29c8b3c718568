//! Error types for graph construction and model evaluation.

mod graph_error;

pub use graph_error::GraphError;
