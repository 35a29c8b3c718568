//! Feature-transform layers.
//!
//! This module contains the row-wise building blocks used by every graph
//! update: dense (fully connected) layers, activation functions, and the
//! MLP-plus-normalization block they compose into.

pub mod activation;
pub mod dense;
pub mod mlp;

pub use activation::Activation;
pub use dense::{Dense, DenseConfig};
pub use mlp::{MlpBlock, MlpBlockConfig};
