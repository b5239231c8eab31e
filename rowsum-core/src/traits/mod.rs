//! Abstract interfaces for rowsum
//!
//! Traits are pure interfaces - no concrete implementations.

pub mod processor;
pub mod source;

pub use processor::PartitionProcessor;
pub use source::PositionedSource;
