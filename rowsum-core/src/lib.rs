#![no_std]

//! rowsum core - dataset layout and partitioning definitions
//!
//! This crate describes the binary dataset (shape, element encoding),
//! divides it across a fixed worker pool, and defines the interfaces the
//! I/O crate implements. It performs no I/O itself.

#[cfg(test)]
extern crate alloc;

pub mod aggregate;
pub mod error;
pub mod format;
pub mod partition;
pub mod traits;
pub mod validation;

pub use aggregate::{reduce, PartialSum, SumProcessor};
pub use error::*;
pub use format::*;
pub use partition::{Partition, PartitionPlan, WorkerId};
pub use traits::*;
pub use validation::*;
