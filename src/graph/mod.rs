//! Graph construction and representation
//!
//! This module provides the edge-list builder and the immutable CSR link
//! graph that PageRank iterates over.

pub mod builder;
pub mod csr;

pub use builder::{EdgeListBuilder, MAX_NODES};
pub use csr::Graph;
