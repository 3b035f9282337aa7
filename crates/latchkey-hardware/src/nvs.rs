//! Nonvolatile region backends.
//!
//! - [`MemoryNvs`] keeps the region in RAM and counts writes. It is the
//!   backend for unit tests and for inspecting exactly which bytes a store
//!   operation touched.
//! - [`FileNvs`] mirrors the region into an image file and syncs every write
//!   to disk before returning, so a simulated unit survives restarts the way
//!   an EEPROM does.

use crate::error::{HardwareError, Result};
use crate::traits::NonvolatileStore;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

fn check_range(offset: usize, len: usize, size: usize) -> Result<()> {
    match offset.checked_add(len) {
        Some(end) if end <= size => Ok(()),
        _ => Err(HardwareError::out_of_range(offset, len, size)),
    }
}

/// Write an erased image next to `path` and rename it into place.
fn create_image(path: &Path, size: usize) -> Result<File> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut staged = NamedTempFile::new_in(dir)?;
    staged.write_all(&vec![0xFF; size])?;
    staged.as_file().sync_all()?;

    let file = staged.persist(path).map_err(io::Error::from)?;
    Ok(file)
}

/// In-memory nonvolatile region.
///
/// Erased memory reads as `0xFF` like a factory-fresh EEPROM, so a new
/// region is never mistaken for a formatted one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryNvs {
    bytes: Vec<u8>,
    write_ops: usize,
    fail_writes: bool,
}

impl MemoryNvs {
    /// Factory-fresh region of `size` bytes (all `0xFF`).
    pub fn new(size: usize) -> Self {
        Self::from_bytes(vec![0xFF; size])
    }

    /// Region with the given initial contents.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            write_ops: 0,
            fail_writes: false,
        }
    }

    /// Current contents of the region.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Number of successful `write` calls since creation.
    pub fn write_ops(&self) -> usize {
        self.write_ops
    }

    /// Make every subsequent write fail, to exercise error paths.
    pub fn set_fail_writes(&mut self, fail: bool) {
        self.fail_writes = fail;
    }
}

impl NonvolatileStore for MemoryNvs {
    fn size(&self) -> usize {
        self.bytes.len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.bytes.len())?;
        buf.copy_from_slice(&self.bytes[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        check_range(offset, data.len(), self.bytes.len())?;
        if self.fail_writes {
            return Err(HardwareError::write_failed(offset, "injected failure"));
        }
        self.bytes[offset..offset + data.len()].copy_from_slice(data);
        self.write_ops += 1;
        Ok(())
    }
}

/// Nonvolatile region persisted to an image file.
///
/// Reads are served from an in-memory mirror; every write updates the mirror,
/// writes through to the file, and calls `sync_data` before returning.
#[derive(Debug)]
pub struct FileNvs {
    path: PathBuf,
    file: File,
    mirror: Vec<u8>,
}

impl FileNvs {
    /// Open the image at `path`, creating a factory-fresh (`0xFF`) image of
    /// `size` bytes if it does not exist or is empty.
    ///
    /// A new image is written to a temporary file in the same directory and
    /// renamed into place, so an interrupted create never leaves a short
    /// image behind.
    ///
    /// # Errors
    ///
    /// Returns `HardwareError::ConfigurationError` if an existing image has a
    /// different size, or an I/O error if the file cannot be opened.
    pub fn open(path: impl AsRef<Path>, size: usize) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let existing_len = match fs::metadata(&path) {
            Ok(meta) => meta.len(),
            Err(err) if err.kind() == io::ErrorKind::NotFound => 0,
            Err(err) => return Err(err.into()),
        };

        if existing_len == 0 {
            let file = create_image(&path, size)?;
            info!(path = %path.display(), size, "created nonvolatile image");
            return Ok(Self {
                path,
                file,
                mirror: vec![0xFF; size],
            });
        }

        let mut file = OpenOptions::new().read(true).write(true).open(&path)?;
        let mut mirror = Vec::with_capacity(size);
        file.read_to_end(&mut mirror)?;
        if mirror.len() != size {
            return Err(HardwareError::configuration(format!(
                "image {} is {} bytes, expected {}",
                path.display(),
                mirror.len(),
                size
            )));
        }
        debug!(path = %path.display(), size, "opened nonvolatile image");

        Ok(Self { path, file, mirror })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl NonvolatileStore for FileNvs {
    fn size(&self) -> usize {
        self.mirror.len()
    }

    fn read(&self, offset: usize, buf: &mut [u8]) -> Result<()> {
        check_range(offset, buf.len(), self.mirror.len())?;
        buf.copy_from_slice(&self.mirror[offset..offset + buf.len()]);
        Ok(())
    }

    fn write(&mut self, offset: usize, data: &[u8]) -> Result<()> {
        check_range(offset, data.len(), self.mirror.len())?;

        self.file.seek(SeekFrom::Start(offset as u64))?;
        self.file.write_all(data)?;
        self.file.sync_data()?;

        self.mirror[offset..offset + data.len()].copy_from_slice(data);
        Ok(())
    }
}
