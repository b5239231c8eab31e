//! Element encoding for the dataset wire format
//!
//! Elements are stored in native byte order with no padding, so encoding is a
//! plain reinterpretation of the element slice.

use super::constants::{Element, ELEMENT_SIZE};
use crate::{Result, RowsumError};

/// View a slice of elements as its on-disk bytes
pub fn as_bytes(elements: &[Element]) -> &[u8] {
    bytemuck::cast_slice(elements)
}

/// Sum the elements encoded in `bytes` without an intermediate buffer
pub fn sum_bytes(bytes: &[u8]) -> Result<i64> {
    if bytes.len() % ELEMENT_SIZE != 0 {
        return Err(RowsumError::ArrayAlignment);
    }
    Ok(bytes
        .chunks_exact(ELEMENT_SIZE)
        .map(|chunk| bytemuck::pod_read_unaligned::<Element>(chunk) as i64)
        .sum())
}
