//! Block file
//!
//! Fixed-size block I/O over a single backing file. Every read and write
//! moves exactly one block between disk and a caller-supplied buffer; writing
//! one block past the current end grows the file.

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::config::SyncStrategy;
use crate::error::{HeapError, Result};

/// Fixed-size block store over one file
#[derive(Debug)]
pub struct BlockFile {
    file: File,
    block_size: usize,
    sync_strategy: SyncStrategy,
}

impl BlockFile {
    /// Create a new, empty block file (truncating any existing file)
    pub fn create(path: &Path, block_size: usize, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new()
            .create(true)
            .read(true)
            .write(true)
            .truncate(true)
            .open(path)?;

        Ok(Self {
            file,
            block_size,
            sync_strategy,
        })
    }

    /// Open an existing block file
    ///
    /// The file length must be a whole number of blocks and cover at least
    /// the two reserved blocks (metadata and block bitmap).
    pub fn open(path: &Path, block_size: usize, sync_strategy: SyncStrategy) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(path)?;

        let len = file.metadata()?.len();
        if len % block_size as u64 != 0 {
            return Err(HeapError::InvalidFormat(format!(
                "file length {} is not a multiple of block size {}",
                len, block_size
            )));
        }
        if len < 2 * block_size as u64 {
            return Err(HeapError::InvalidFormat(format!(
                "file too short ({} bytes) to hold the reserved blocks",
                len
            )));
        }

        Ok(Self {
            file,
            block_size,
            sync_strategy,
        })
    }

    /// Block size in bytes
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Highest allocated block index
    ///
    /// Derived from the file length; a freshly created file has no blocks
    /// until the first write.
    pub fn last_block(&self) -> Result<Option<u32>> {
        let len = self.file.metadata()?.len();
        let blocks = len / self.block_size as u64;
        Ok(blocks.checked_sub(1).map(|b| b as u32))
    }

    /// Read one block into `buf`
    pub fn read(&mut self, block: u32, buf: &mut [u8]) -> Result<()> {
        debug_assert_eq!(buf.len(), self.block_size);
        self.file
            .seek(SeekFrom::Start(block as u64 * self.block_size as u64))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Write one block from `buf`
    ///
    /// Writing block `last_block + 1` grows the file by one block.
    pub fn write(&mut self, block: u32, buf: &[u8]) -> Result<()> {
        debug_assert_eq!(buf.len(), self.block_size);
        self.file
            .seek(SeekFrom::Start(block as u64 * self.block_size as u64))?;
        self.file.write_all(buf)?;
        if self.sync_strategy == SyncStrategy::EveryWrite {
            self.file.sync_all()?;
        }
        Ok(())
    }

    /// Allocate a zeroed buffer of one block
    pub fn new_buffer(&self) -> Vec<u8> {
        vec![0u8; self.block_size]
    }
}
