//! Read access to a generated dataset
//!
//! Three strategies share one [`DatasetSource`] front:
//! - [`FileSource`]: positioned reads (`pread`) on one `File`; no cursor, no lock
//! - [`MmapSource`]: a read-only memory map shared by every worker
//! - [`SharedCursorSource`]: one seekable cursor behind a mutex. A worker holds
//!   the lock for its whole range, so reads are serialized across workers.

use crate::config::ReadMode;
use crate::error::{Error, Result};
use rowsum_core::{validate_dataset_len, DatasetShape, PositionedSource, RowsumError};
use std::fs::File;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[cfg(feature = "mmap")]
use memmap2::{Mmap, MmapOptions};

fn open_checked(path: &Path, shape: &DatasetShape) -> Result<(File, u64)> {
    let file = File::open(path).map_err(|e| Error::io("opening the file", e))?;
    let len = file
        .metadata()
        .map_err(|e| Error::io("reading file metadata", e))?
        .len();
    match validate_dataset_len(len, shape) {
        Ok(()) => Ok((file, len)),
        Err(RowsumError::LengthMismatch | RowsumError::ArrayAlignment) => Err(Error::DatasetSize {
            expected: shape.byte_len() as u64,
            actual: len,
        }),
        Err(other) => Err(other.into()),
    }
}

/// Positioned reads on a shared file handle
#[derive(Debug)]
pub struct FileSource {
    file: File,
    len: u64,
}

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P, shape: &DatasetShape) -> Result<Self> {
        let (file, len) = open_checked(path.as_ref(), shape)?;
        Ok(Self { file, len })
    }
}

impl PositionedSource for FileSource {
    type Error = io::Error;

    #[cfg(unix)]
    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        use std::os::unix::fs::FileExt;
        self.file.read_exact_at(buf, offset)
    }

    #[cfg(windows)]
    fn read_exact_at(&self, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
        use std::os::windows::fs::FileExt;
        while !buf.is_empty() {
            match self.file.seek_read(buf, offset) {
                Ok(0) => return Err(io::ErrorKind::UnexpectedEof.into()),
                Ok(n) => {
                    buf = &mut buf[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    fn byte_len(&self) -> u64 {
        self.len
    }
}

/// Read-only memory map of the dataset
#[cfg(feature = "mmap")]
#[derive(Debug)]
pub struct MmapSource {
    mmap: Mmap,
}

#[cfg(feature = "mmap")]
impl MmapSource {
    pub fn open<P: AsRef<Path>>(path: P, shape: &DatasetShape) -> Result<Self> {
        let (file, _) = open_checked(path.as_ref(), shape)?;

        // SAFETY: Read-only mapping; the dataset is not written while mapped
        // because generation completes before aggregation opens it.
        let mmap = unsafe {
            MmapOptions::new()
                .map(&file)
                .map_err(|e| Error::io("memory mapping the file", e))?
        };
        Ok(Self { mmap })
    }
}

#[cfg(feature = "mmap")]
impl PositionedSource for MmapSource {
    type Error = io::Error;

    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        let start = usize::try_from(offset).map_err(|_| io::Error::from(io::ErrorKind::UnexpectedEof))?;
        let bytes = start
            .checked_add(buf.len())
            .and_then(|end| self.mmap.get(start..end))
            .ok_or(io::ErrorKind::UnexpectedEof)?;
        buf.copy_from_slice(bytes);
        Ok(())
    }

    fn byte_len(&self) -> u64 {
        self.mmap.len() as u64
    }
}

/// A single seekable cursor shared under a mutex
#[derive(Debug)]
pub struct SharedCursorSource {
    file: Mutex<File>,
    len: u64,
}

/// Exclusive hold on the shared cursor
pub struct CursorGuard<'a> {
    file: MutexGuard<'a, File>,
}

impl SharedCursorSource {
    pub fn open<P: AsRef<Path>>(path: P, shape: &DatasetShape) -> Result<Self> {
        let (file, len) = open_checked(path.as_ref(), shape)?;
        Ok(Self {
            file: Mutex::new(file),
            len,
        })
    }

    /// Lock the cursor and seek it to `offset`
    ///
    /// Other workers block until the guard is dropped.
    pub fn lock_at(&self, offset: u64) -> io::Result<CursorGuard<'_>> {
        let mut file = self.file.lock().unwrap_or_else(PoisonError::into_inner);
        file.seek(SeekFrom::Start(offset))?;
        Ok(CursorGuard { file })
    }
}

impl CursorGuard<'_> {
    /// Read the next `buf.len()` bytes from the cursor
    pub fn read_next(&mut self, buf: &mut [u8]) -> io::Result<()> {
        self.file.read_exact(buf)
    }
}

impl PositionedSource for SharedCursorSource {
    type Error = io::Error;

    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        self.lock_at(offset)?.read_next(buf)
    }

    fn byte_len(&self) -> u64 {
        self.len
    }
}

/// Dataset opened with one of the [`ReadMode`] strategies
#[derive(Debug)]
pub enum DatasetSource {
    Positioned(FileSource),
    #[cfg(feature = "mmap")]
    Mmap(MmapSource),
    SharedCursor(SharedCursorSource),
}

impl DatasetSource {
    /// Open the dataset at `path`, checking its size against `shape`
    pub fn open<P: AsRef<Path>>(path: P, shape: &DatasetShape, mode: ReadMode) -> Result<Self> {
        Ok(match mode {
            ReadMode::Positioned => DatasetSource::Positioned(FileSource::open(path, shape)?),
            #[cfg(feature = "mmap")]
            ReadMode::Mmap => DatasetSource::Mmap(MmapSource::open(path, shape)?),
            ReadMode::SharedCursor => {
                DatasetSource::SharedCursor(SharedCursorSource::open(path, shape)?)
            }
        })
    }

    pub fn mode(&self) -> ReadMode {
        match self {
            DatasetSource::Positioned(_) => ReadMode::Positioned,
            #[cfg(feature = "mmap")]
            DatasetSource::Mmap(_) => ReadMode::Mmap,
            DatasetSource::SharedCursor(_) => ReadMode::SharedCursor,
        }
    }
}

impl PositionedSource for DatasetSource {
    type Error = io::Error;

    fn read_exact_at(&self, buf: &mut [u8], offset: u64) -> io::Result<()> {
        match self {
            DatasetSource::Positioned(source) => source.read_exact_at(buf, offset),
            #[cfg(feature = "mmap")]
            DatasetSource::Mmap(source) => source.read_exact_at(buf, offset),
            DatasetSource::SharedCursor(source) => source.read_exact_at(buf, offset),
        }
    }

    fn byte_len(&self) -> u64 {
        match self {
            DatasetSource::Positioned(source) => source.byte_len(),
            #[cfg(feature = "mmap")]
            DatasetSource::Mmap(source) => source.byte_len(),
            DatasetSource::SharedCursor(source) => source.byte_len(),
        }
    }
}
