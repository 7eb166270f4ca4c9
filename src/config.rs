//! Configuration for heapstore
//!
//! Centralized configuration with sensible defaults.

/// Main configuration for a heapstore database file
#[derive(Debug, Clone)]
pub struct Config {
    // -------------------------------------------------------------------------
    // Storage Configuration
    // -------------------------------------------------------------------------
    /// Size of every block in the file, in bytes.
    ///
    /// This is a store-level constant shared by all blocks: a file must be
    /// opened with the same block size it was created with. The block size
    /// also bounds total capacity, since the block-occupancy bitmap in block 1
    /// carries one bit per block (`block_size * 8` blocks).
    pub block_size: usize,

    // -------------------------------------------------------------------------
    // Durability Configuration
    // -------------------------------------------------------------------------
    /// Sync strategy: when to fsync block writes
    pub sync_strategy: SyncStrategy,
}

/// Block write sync strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStrategy {
    /// fsync after every block write (safest, slowest)
    EveryWrite,

    /// Leave flushing to the OS page cache (default)
    OsManaged,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            block_size: 512,
            sync_strategy: SyncStrategy::OsManaged,
        }
    }
}

impl Config {
    /// Create a new config builder
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }
}

/// Builder for Config
#[derive(Default)]
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    /// Set the block size (in bytes)
    pub fn block_size(mut self, size: usize) -> Self {
        self.config.block_size = size;
        self
    }

    /// Set the sync strategy for block writes
    pub fn sync_strategy(mut self, strategy: SyncStrategy) -> Self {
        self.config.sync_strategy = strategy;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}
