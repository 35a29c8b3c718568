//! Batched graph data and the update blocks that operate on it.
//!
//! [`GraphBatch`] holds one or more graphs as flat edge/node/global feature
//! tensors plus connectivity and per-graph counts. Two kinds of block
//! transform a batch into a new batch over the same topology:
//! [`GraphIndependent`] applies per-entity feature transforms with no
//! cross-entity communication, while [`GraphNetwork`] runs one full
//! message-passing step (edge update, then node update over aggregated
//! incident edges, then global update over per-graph aggregates).

mod aggregate;
mod batch;
mod independent;
mod network;

pub use aggregate::{scatter_sum, segment_sum};
pub use batch::GraphBatch;
pub use independent::{GraphIndependent, GraphIndependentConfig};
pub use network::{GraphNetwork, GraphNetworkConfig};
