//! Binary dataset format definitions
//!
//! Pure data layout definitions for the dataset file. No I/O.

pub mod constants;
pub mod element;
pub mod shape;

pub use constants::{Element, ELEMENT_SIZE};
pub use shape::DatasetShape;
