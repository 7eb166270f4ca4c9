//! # heapstore
//!
//! A single-file, block-structured heap storage engine with:
//! - Fixed-layout records in fixed-size blocks
//! - Bitmap free-space tracking at block and record-slot granularity
//! - Optional single-integer-key secondary indexes (ordered or hash)
//! - Insert / delete / point-lookup / field-equality lookup / full scan
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       HeapFile Engine                       │
//! │        (allocation, CRUD, scan, index maintenance)          │
//! └──────┬─────────────────┬─────────────────┬──────────────────┘
//!        │                 │                 │
//!        ▼                 ▼                 ▼
//! ┌─────────────┐   ┌─────────────┐   ┌─────────────┐
//! │  BlockFile  │   │   Schema    │   │ FieldIndex  │
//! │ (block I/O) │   │   (codec)   │   │Ordered/Hash │
//! └──────┬──────┘   └─────────────┘   └─────────────┘
//!        │
//!        ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  file: [meta][block bitmap][data][data][data]...            │
//! │         blk 0    blk 1      blk 2..N                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is a library boundary only: single-threaded, synchronous, no
//! transactions or crash recovery.

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod bitmap;
pub mod block;
pub mod schema;
pub mod record;
pub mod index;
pub mod engine;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{HeapError, Result};
pub use config::{Config, SyncStrategy};
pub use engine::{HeapFile, RecordLayout, Scan};
pub use index::{FieldIndex, HashIndex, OrderedIndex};
pub use record::{Record, Value};
pub use schema::{Field, FieldType, Schema};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of heapstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
