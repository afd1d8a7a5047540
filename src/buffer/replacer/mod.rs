//! Eviction policy implementations (replacers).
//!
//! Currently implements:
//! - [`FifoReplacer`] - Admission-order FIFO, restricted to clean pages by the cache

mod fifo;

pub use fifo::FifoReplacer;
