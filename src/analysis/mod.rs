//! Analysis modules.
//!
//! Home of the aggregation pipeline and the numeric helpers it and the
//! report layer share.

pub mod aggregator;
pub mod stats;

pub use aggregator::*;
