//! Parsing utilities for shape and count strings
//!
//! Pure parsing functions with no I/O dependencies, used for
//! command-line values such as `100x50`.

use crate::format::DatasetShape;
use crate::RowsumError;

/// Parse a shape string in the format "ROWSxCOLUMNS" or "ROWS:COLUMNS"
pub fn parse_shape(shape_str: &str) -> Result<DatasetShape, RowsumError> {
    if shape_str.is_empty() {
        return Err(RowsumError::InvalidFormat);
    }

    let separator = shape_str
        .find(|c: char| matches!(c, 'x' | 'X' | ':'))
        .ok_or(RowsumError::InvalidFormat)?;
    let rows = parse_usize(&shape_str[..separator])?;
    let columns = parse_usize(&shape_str[separator + 1..])?;

    DatasetShape::new(rows, columns)
}

/// Parse a positive worker count
pub fn parse_workers(count_str: &str) -> Result<usize, RowsumError> {
    match parse_usize(count_str)? {
        0 => Err(RowsumError::ZeroWorkers),
        count => Ok(count),
    }
}

/// Parse a usize from a string with error handling
fn parse_usize(s: &str) -> Result<usize, RowsumError> {
    if s.is_empty() {
        return Err(RowsumError::InvalidFormat);
    }

    // Parse manually to avoid std dependency
    let mut result: usize = 0;

    for byte in s.bytes() {
        if !byte.is_ascii_digit() {
            return Err(RowsumError::InvalidFormat);
        }

        let digit = (byte - b'0') as usize;

        if result > (usize::MAX - digit) / 10 {
            return Err(RowsumError::ShapeOverflow);
        }

        result = result * 10 + digit;
    }

    Ok(result)
}
