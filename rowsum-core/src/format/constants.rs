//! Dataset layout constants

/// Element type stored in the dataset
pub type Element = i32;

/// Size of one stored element in bytes
pub const ELEMENT_SIZE: usize = core::mem::size_of::<Element>();

/// Default number of rows
pub const DEFAULT_ROWS: usize = 100;

/// Default number of columns per row
pub const DEFAULT_COLUMNS: usize = 50;

/// Default worker pool size
pub const DEFAULT_WORKERS: usize = 4;

/// Smallest value the generator produces
pub const MIN_VALUE: Element = 0;

/// Largest value the generator produces (inclusive)
pub const MAX_VALUE: Element = 100;
