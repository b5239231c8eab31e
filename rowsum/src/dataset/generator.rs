//! Random dataset generation

use crate::cancel::CancelToken;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rowsum_core::format::constants::{MAX_VALUE, MIN_VALUE};
use rowsum_core::format::element::as_bytes;
use rowsum_core::{DatasetShape, Element};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// What the generator wrote
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationReport {
    pub elements: usize,
    /// Sum of every generated element, computed while writing
    pub sum: i64,
}

/// Writes `rows * columns` uniform values in `[MIN_VALUE, MAX_VALUE]`
#[derive(Debug, Clone)]
pub struct Generator {
    shape: DatasetShape,
    seed: Option<u64>,
}

impl Generator {
    pub fn new(shape: DatasetShape) -> Self {
        Self { shape, seed: None }
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        self.seed = seed;
        self
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }

    /// Create (or truncate) the dataset at `path` and fill it
    ///
    /// The file is flushed and synced before this returns, so the dataset
    /// is complete once the report is visible.
    pub fn generate<P: AsRef<Path>>(&self, path: P, token: &CancelToken) -> Result<GenerationReport> {
        let path = path.as_ref();
        let file = File::create(path).map_err(|e| Error::io("creating the file", e))?;
        info!(path = %path.display(), shape = %self.shape, "generating dataset");

        let mut writer = BufWriter::with_capacity(self.shape.row_bytes().max(8 * 1024), file);
        let report = self.write_to(&mut writer, token)?;
        let file = writer
            .into_inner()
            .map_err(|e| Error::io("flushing the file", e.into_error()))?;
        file.sync_all()
            .map_err(|e| Error::io("syncing the file", e))?;

        debug!(sum = report.sum, "dataset written");
        Ok(report)
    }

    /// Write the dataset row by row to `writer`
    pub fn write_to<W: Write>(&self, writer: &mut W, token: &CancelToken) -> Result<GenerationReport> {
        let mut rng = self.rng();
        let mut row: Vec<Element> = vec![0; self.shape.columns];
        let mut sum = 0i64;

        for _ in 0..self.shape.rows {
            for value in row.iter_mut() {
                *value = rng.gen_range(MIN_VALUE..=MAX_VALUE);
                sum += *value as i64;
            }
            writer
                .write_all(as_bytes(&row))
                .map_err(|e| Error::io("writing to file", e))?;
            token.checkpoint()?;
        }

        Ok(GenerationReport {
            elements: self.shape.element_count(),
            sum,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rowsum_core::format::element::sum_bytes;
    use rowsum_core::ELEMENT_SIZE;

    #[test]
    fn test_values_in_range_and_sum_matches() {
        let shape = DatasetShape::default();
        for seed in 0..5 {
            let mut bytes = Vec::new();
            let report = Generator::new(shape)
                .with_seed(Some(seed))
                .write_to(&mut bytes, &CancelToken::new())
                .unwrap();

            assert_eq!(bytes.len(), shape.byte_len());
            assert_eq!(report.elements, 5000);
            assert_eq!(sum_bytes(&bytes), Ok(report.sum));
            for chunk in bytes.chunks_exact(ELEMENT_SIZE) {
                let value = bytemuck::pod_read_unaligned::<Element>(chunk);
                assert!((MIN_VALUE..=MAX_VALUE).contains(&value), "value {value} out of range");
            }
        }
    }

    #[test]
    fn test_seed_is_reproducible() {
        let shape = DatasetShape::new(4, 8).unwrap();
        let token = CancelToken::new();
        let mut first = Vec::new();
        let mut second = Vec::new();
        Generator::new(shape).with_seed(Some(42)).write_to(&mut first, &token).unwrap();
        Generator::new(shape).with_seed(Some(42)).write_to(&mut second, &token).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_generate_truncates_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.bin");
        std::fs::write(&path, vec![0xffu8; 100_000]).unwrap();

        let shape = DatasetShape::new(10, 5).unwrap();
        let report = Generator::new(shape)
            .generate(&path, &CancelToken::new())
            .unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(bytes.len(), 200);
        assert_eq!(sum_bytes(&bytes), Ok(report.sum));
    }

    #[test]
    fn test_cancelled_generation_aborts() {
        let token = CancelToken::new();
        token.cancel();
        let mut bytes = Vec::new();
        let result = Generator::new(DatasetShape::default()).write_to(&mut bytes, &token);
        assert!(matches!(result, Err(Error::Aborted)));
        // Stops at the first safe point, after one row.
        assert_eq!(bytes.len(), DatasetShape::default().row_bytes());
    }

    #[test]
    fn test_missing_directory_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("data.bin");
        let result = Generator::new(DatasetShape::default()).generate(&path, &CancelToken::new());
        assert!(matches!(result, Err(Error::Io { op: "creating the file", .. })));
    }
}
