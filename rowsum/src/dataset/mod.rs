//! Dataset generation and read access
//!
//! The dataset is a flat, headerless file of native-endian `i32`s in
//! row-major order. See `rowsum_core::format` for the layout.

pub mod generator;
pub mod source;

pub use generator::{GenerationReport, Generator};
#[cfg(feature = "mmap")]
pub use source::MmapSource;
pub use source::{CursorGuard, DatasetSource, FileSource, SharedCursorSource};
