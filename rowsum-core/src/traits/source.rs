//! Positioned read interface for dataset storage
//!
//! Readers address the dataset by absolute byte offset rather than through a
//! shared cursor, so any number of workers can read through one source.

/// Trait for storage that supports reads at explicit byte offsets
pub trait PositionedSource {
    /// Error type for read operations
    type Error;

    /// Fill `buf` with the bytes starting at `offset`
    ///
    /// Implementations must either fill the whole buffer or fail; a short
    /// read is an error, never a partial success.
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> Result<(), Self::Error>;

    /// Total size of the source in bytes
    fn byte_len(&self) -> u64;
}
