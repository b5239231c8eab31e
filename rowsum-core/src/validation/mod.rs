//! Layout validation utilities
//!
//! Pure validation and parsing functions with no I/O dependencies.

pub mod bounds;
pub mod parsing;

pub use bounds::{validate_array_bounds, validate_dataset_len, validate_partition_bounds};
pub use parsing::{parse_shape, parse_workers};
