//! Heap file engine
//!
//! The core storage engine: an unordered collection of fixed-layout records
//! spread across the data blocks of a single file, located by scanning or by
//! secondary index.
//!
//! ## Responsibilities
//! - Compute the record layout within data blocks
//! - Allocate blocks through the block-occupancy bitmap
//! - Place and remove records through per-block record-occupancy bitmaps
//! - Keep every installed index synchronized with insert/delete
//!
//! ## File Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │ Block 0: Metadata                                           │
//! │   FileType: i32 (4) | Version: i32 (4) |                    │
//! │   SchemaLen: u32 (4) | Schema blob (bincode, variable)      │
//! ├─────────────────────────────────────────────────────────────┤
//! │ Block 1: Block-occupancy bitmap                             │
//! │   one bit per block, 1 = full, 0 = has room                 │
//! │   (bits 0 and 1 are set at creation for the reserved blocks)│
//! ├─────────────────────────────────────────────────────────────┤
//! │ Blocks 2..N: Data                                           │
//! │   record bitmap (rec_map_size bytes), then fixed-size       │
//! │   record slots at rec_map_size + i * rec_size               │
//! └─────────────────────────────────────────────────────────────┘
//! ```

mod scan;

pub use scan::Scan;

use std::path::Path;

use crate::bitmap::Bitmap;
use crate::block::BlockFile;
use crate::config::Config;
use crate::error::{HeapError, Result};
use crate::index::{FieldIndex, HashIndex, OrderedIndex};
use crate::record::Record;
use crate::schema::{FieldType, Schema};

// =============================================================================
// Shared Format Constants
// =============================================================================

/// Block holding the metadata region
const METADATA_BLOCK: u32 = 0;

/// Block holding the block-occupancy bitmap
const BITMAP_BLOCK: u32 = 1;

/// First data block
pub(crate) const FIRST_DATA_BLOCK: u32 = 2;

/// File-type tag stored at the start of the metadata block
const FILE_TYPE: i32 = i32::from_le_bytes(*b"HEAP");

/// Current file format version
const FILE_VERSION: i32 = 1;

/// Metadata block offsets
const FILE_TYPE_POS: usize = 0;
const VERSION_POS: usize = 4;
const SCHEMA_LEN_POS: usize = 8;
const SCHEMA_POS: usize = 12;

// =============================================================================
// Record Layout
// =============================================================================

/// Derived layout of records within a data block
///
/// Every stored record needs `rec_size` bytes plus one bit in the record
/// bitmap, so the slot count divides the usable block space by
/// `rec_size + 1/8` bytes rather than by `rec_size`:
///
/// ```text
/// recs_per_block = ((block_size - 1) * 8) / (8 * rec_size + 1)
/// rec_map_size   = recs_per_block / 8
/// ```
///
/// Both divisions floor. The record bitmap physically occupies
/// `rec_map_size` bytes, so the usable slot count per block is its bit
/// count, [`slots()`](RecordLayout::slots) — at most `recs_per_block`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordLayout {
    /// Bytes per record
    pub rec_size: usize,
    /// Slot count given by the layout formula
    pub recs_per_block: usize,
    /// Bytes in the record-occupancy bitmap
    pub rec_map_size: usize,
}

impl RecordLayout {
    /// Compute the layout for the given block and record sizes
    pub fn compute(block_size: usize, rec_size: usize) -> Self {
        let recs_per_block = ((block_size - 1) * 8) / (8 * rec_size + 1);
        let rec_map_size = recs_per_block / 8;
        Self {
            rec_size,
            recs_per_block,
            rec_map_size,
        }
    }

    /// Usable record slots per block (the record bitmap's bit count)
    pub fn slots(&self) -> usize {
        self.rec_map_size * 8
    }

    /// Byte offset of slot `i` within its block
    pub fn slot_offset(&self, i: usize) -> usize {
        self.rec_map_size + i * self.rec_size
    }
}

// =============================================================================
// Heap File
// =============================================================================

/// A heap-file database over a single block-structured file
///
/// All operations are synchronous and take `&mut self`: the engine owns two
/// scratch buffers (the block-bitmap block and the current data block) that
/// are reused across calls, so overlapping operations have no defined
/// interleaving. The borrow checker enforces this — in particular a live
/// [`Scan`] exclusively borrows the engine.
///
/// There are no transactions: an I/O failure mid-operation can leave the
/// block bitmap and a data block inconsistent. This is a known limitation
/// and is not masked.
#[derive(Debug)]
pub struct HeapFile {
    pub(crate) file: BlockFile,
    pub(crate) schema: Schema,
    pub(crate) layout: RecordLayout,

    /// Scratch buffer for the block-occupancy bitmap (block 1)
    block_map_buf: Vec<u8>,
    /// Scratch buffer for the data block currently being operated on
    buf: Vec<u8>,

    /// indexes[f] is the index installed on schema field f, if any
    indexes: Vec<Option<FieldIndex>>,
}

impl HeapFile {
    /// Create a new, empty database with the given schema
    ///
    /// Writes the metadata block and the block-bitmap block (with the two
    /// reserved blocks marked occupied) and computes the record layout.
    pub fn create(path: &Path, schema: Schema, config: &Config) -> Result<Self> {
        let layout = RecordLayout::compute(config.block_size, schema.len());
        if layout.slots() == 0 {
            return Err(HeapError::Schema(format!(
                "a {}-byte record does not fit a {}-byte block",
                schema.len(),
                config.block_size
            )));
        }

        let mut file = BlockFile::create(path, config.block_size, config.sync_strategy)?;

        // Block 0: metadata
        let mut meta = file.new_buffer();
        meta[FILE_TYPE_POS..FILE_TYPE_POS + 4].copy_from_slice(&FILE_TYPE.to_le_bytes());
        meta[VERSION_POS..VERSION_POS + 4].copy_from_slice(&FILE_VERSION.to_le_bytes());
        let blob = schema.to_bytes()?;
        if SCHEMA_POS + blob.len() > config.block_size {
            return Err(HeapError::Schema(format!(
                "serialized schema ({} bytes) does not fit the metadata block",
                blob.len()
            )));
        }
        meta[SCHEMA_LEN_POS..SCHEMA_LEN_POS + 4]
            .copy_from_slice(&(blob.len() as u32).to_le_bytes());
        meta[SCHEMA_POS..SCHEMA_POS + blob.len()].copy_from_slice(&blob);
        file.write(METADATA_BLOCK, &meta)?;

        // Block 1: block bitmap, reserved blocks marked occupied
        let mut block_map_buf = file.new_buffer();
        {
            let mut block_map = Bitmap::new(&mut block_map_buf);
            block_map.set(METADATA_BLOCK as usize, true);
            block_map.set(BITMAP_BLOCK as usize, true);
        }
        file.write(BITMAP_BLOCK, &block_map_buf)?;

        let buf = file.new_buffer();
        let field_count = schema.field_count();

        tracing::info!(
            path = %path.display(),
            block_size = config.block_size,
            rec_size = layout.rec_size,
            slots_per_block = layout.slots(),
            "created heap file"
        );

        Ok(Self {
            file,
            schema,
            layout,
            block_map_buf,
            buf,
            indexes: std::iter::repeat_with(|| None).take(field_count).collect(),
        })
    }

    /// Open an existing database, recovering the schema from the file
    ///
    /// Indexes are not persisted; they start empty and must be recreated by
    /// the caller if desired.
    pub fn open(path: &Path, config: &Config) -> Result<Self> {
        let mut file = BlockFile::open(path, config.block_size, config.sync_strategy)?;

        // Read and validate the metadata block
        let mut meta = file.new_buffer();
        file.read(METADATA_BLOCK, &mut meta)?;

        let file_type = i32::from_le_bytes(meta[FILE_TYPE_POS..FILE_TYPE_POS + 4].try_into()
            .map_err(|_| HeapError::InvalidFormat("metadata block truncated".into()))?);
        if file_type != FILE_TYPE {
            return Err(HeapError::InvalidFormat(format!(
                "unrecognized file type tag {:#010x}",
                file_type
            )));
        }
        let version = i32::from_le_bytes(meta[VERSION_POS..VERSION_POS + 4].try_into()
            .map_err(|_| HeapError::InvalidFormat("metadata block truncated".into()))?);
        if version != FILE_VERSION {
            return Err(HeapError::InvalidFormat(format!(
                "unsupported file version {}",
                version
            )));
        }

        let schema_len = u32::from_le_bytes(meta[SCHEMA_LEN_POS..SCHEMA_LEN_POS + 4].try_into()
            .map_err(|_| HeapError::InvalidFormat("metadata block truncated".into()))?)
            as usize;
        if SCHEMA_POS + schema_len > config.block_size {
            return Err(HeapError::InvalidFormat(format!(
                "schema length {} exceeds the metadata block",
                schema_len
            )));
        }
        let schema = Schema::from_bytes(&meta[SCHEMA_POS..SCHEMA_POS + schema_len])?;

        let layout = RecordLayout::compute(config.block_size, schema.len());
        if layout.slots() == 0 {
            return Err(HeapError::InvalidFormat(format!(
                "a {}-byte record does not fit a {}-byte block",
                schema.len(),
                config.block_size
            )));
        }

        // Read the block bitmap into its scratch buffer
        let mut block_map_buf = file.new_buffer();
        file.read(BITMAP_BLOCK, &mut block_map_buf)?;

        let buf = file.new_buffer();
        let field_count = schema.field_count();

        tracing::info!(path = %path.display(), "opened heap file");

        Ok(Self {
            file,
            schema,
            layout,
            block_map_buf,
            buf,
            indexes: std::iter::repeat_with(|| None).take(field_count).collect(),
        })
    }

    /// The schema this file was created with
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The derived record layout
    pub fn layout(&self) -> RecordLayout {
        self.layout
    }

    /// Usable record slots per data block
    pub fn slots_per_block(&self) -> usize {
        self.layout.slots()
    }

    // =========================================================================
    // CRUD
    // =========================================================================

    /// Insert a record
    ///
    /// Returns `Ok(false)` without mutating anything if a live record with
    /// the same primary key already exists. Fails with
    /// [`HeapError::DatabaseFull`] when the block bitmap has no free bit
    /// left for a new block.
    pub fn insert(&mut self, rec: &Record) -> Result<bool> {
        let key = self.schema.key_of(rec)?;

        // Primary keys are unique across live records
        if self.lookup(key)?.is_some() {
            return Ok(false);
        }

        self.file.read(BITMAP_BLOCK, &mut self.block_map_buf)?;

        // Placement, with at most one grow-and-retry
        let mut grown = false;
        loop {
            let candidate = Bitmap::new(&mut self.block_map_buf)
                .first_zero()
                .ok_or(HeapError::DatabaseFull)? as u32;
            let last = self.file.last_block()?.unwrap_or(BITMAP_BLOCK);

            if candidate >= FIRST_DATA_BLOCK && candidate <= last {
                self.file.read(candidate, &mut self.buf)?;
                let free_slot =
                    Bitmap::new(&mut self.buf[..self.layout.rec_map_size]).first_zero();
                if let Some(slot) = free_slot {
                    return self.place(rec, key, candidate, slot);
                }
                // The bitmap claimed room but the block is full; fall through
                // and start a new block, as the non-bitmap path does.
            }

            if grown {
                return Err(HeapError::DatabaseFull);
            }
            self.grow(last)?;
            grown = true;
        }
    }

    /// Write `rec` into `slot` of `block` and update all bookkeeping
    fn place(&mut self, rec: &Record, key: i32, block: u32, slot: usize) -> Result<bool> {
        let offset = self.layout.slot_offset(slot);
        self.schema.write_record(rec, &mut self.buf, offset)?;

        let block_full = {
            let mut rec_map = Bitmap::new(&mut self.buf[..self.layout.rec_map_size]);
            rec_map.set(slot, true);
            rec_map.first_zero().is_none()
        };
        self.file.write(block, &self.buf)?;

        if block_full {
            Bitmap::new(&mut self.block_map_buf).set(block as usize, true);
            self.file.write(BITMAP_BLOCK, &self.block_map_buf)?;
        }

        self.index_insert(rec, block)?;
        tracing::debug!(block, slot, key, "inserted record");
        Ok(true)
    }

    /// Allocate and persist a zeroed data block after `last`
    fn grow(&mut self, last: u32) -> Result<()> {
        let new_block = last + 1;
        if new_block as usize >= Bitmap::new(&mut self.block_map_buf).len() {
            return Err(HeapError::DatabaseFull);
        }

        self.buf.fill(0);
        self.file.write(new_block, &self.buf)?;
        Bitmap::new(&mut self.block_map_buf).set(new_block as usize, false);
        self.file.write(BITMAP_BLOCK, &self.block_map_buf)?;

        tracing::debug!(block = new_block, "allocated new data block");
        Ok(())
    }

    /// Delete the record with the given primary key
    ///
    /// Returns `Ok(false)` if no live record has the key.
    pub fn delete(&mut self, key: i32) -> Result<bool> {
        self.file.read(BITMAP_BLOCK, &mut self.block_map_buf)?;
        let last = self.file.last_block()?.unwrap_or(BITMAP_BLOCK);
        let key_field = self.schema.key_index();

        for block in FIRST_DATA_BLOCK..=last {
            self.file.read(block, &mut self.buf)?;
            for slot in 0..self.layout.slots() {
                let occupied =
                    Bitmap::new(&mut self.buf[..self.layout.rec_map_size]).get(slot);
                if !occupied {
                    continue;
                }
                let rec = self
                    .schema
                    .read_record(&self.buf, self.layout.slot_offset(slot));
                if self.schema.int_value(&rec, key_field)? != key {
                    continue;
                }

                // Found it: a delete is just clearing the slot's bit
                Bitmap::new(&mut self.buf[..self.layout.rec_map_size]).set(slot, false);
                self.file.write(block, &self.buf)?;

                // The block has room again
                let was_full = Bitmap::new(&mut self.block_map_buf).get(block as usize);
                if was_full {
                    Bitmap::new(&mut self.block_map_buf).set(block as usize, false);
                    self.file.write(BITMAP_BLOCK, &self.block_map_buf)?;
                }

                self.index_delete(&rec, block)?;
                tracing::debug!(block, slot, key, "deleted record");
                return Ok(true);
            }
        }
        Ok(false)
    }

    /// Modify a record in place
    ///
    /// Not implemented by design; always fails with
    /// [`HeapError::UnsupportedOperation`].
    pub fn modify(&mut self, _rec: &Record) -> Result<()> {
        Err(HeapError::UnsupportedOperation("modify"))
    }

    /// Point lookup by primary key
    pub fn lookup(&mut self, key: i32) -> Result<Option<Record>> {
        let key_field = self.schema.key_index();
        let mut recs = self.lookup_by_field_index(key_field, key)?;
        if recs.is_empty() {
            Ok(None)
        } else {
            Ok(Some(recs.swap_remove(0)))
        }
    }

    /// All live records whose named field equals `key`
    ///
    /// Uses the field's index when one is installed (candidate blocks from
    /// the index, then an in-block equality scan to weed out block-granular
    /// false positives); otherwise a full linear scan.
    pub fn lookup_field(&mut self, field: &str, key: i32) -> Result<Vec<Record>> {
        let field_num = self
            .schema
            .field_index(field)
            .ok_or_else(|| HeapError::UnknownField(field.to_string()))?;
        self.lookup_by_field_index(field_num, key)
    }

    fn lookup_by_field_index(&mut self, field: usize, key: i32) -> Result<Vec<Record>> {
        if self.schema.field(field).ty() != FieldType::Int {
            return Err(HeapError::FieldTypeMismatch {
                field: self.schema.field(field).name().to_string(),
            });
        }

        let candidates = self.indexes[field].as_ref().map(|idx| idx.lookup(key));
        let mut result = Vec::new();
        match candidates {
            Some(blocks) => {
                for block in blocks {
                    self.lookup_in_block(field, key, block, &mut result)?;
                }
            }
            None => {
                // No index on this field: scan every allocated data block
                let last = self.file.last_block()?.unwrap_or(BITMAP_BLOCK);
                for block in FIRST_DATA_BLOCK..=last {
                    self.lookup_in_block(field, key, block, &mut result)?;
                }
            }
        }
        Ok(result)
    }

    /// Linear search of one block for records whose `field` equals `key`
    fn lookup_in_block(
        &mut self,
        field: usize,
        key: i32,
        block: u32,
        result: &mut Vec<Record>,
    ) -> Result<()> {
        self.file.read(block, &mut self.buf)?;
        for slot in 0..self.layout.slots() {
            let occupied = Bitmap::new(&mut self.buf[..self.layout.rec_map_size]).get(slot);
            if !occupied {
                continue;
            }
            let rec = self
                .schema
                .read_record(&self.buf, self.layout.slot_offset(slot));
            if self.schema.int_value(&rec, field)? == key {
                result.push(rec);
            }
        }
        Ok(())
    }

    /// Number of live records (linear scan)
    pub fn size(&mut self) -> Result<usize> {
        let mut count = 0;
        for item in self.scan()? {
            item?;
            count += 1;
        }
        Ok(count)
    }

    /// Sequential scan over all live records
    ///
    /// The scan exclusively borrows the engine for its lifetime: no insert,
    /// delete, or lookup may interleave with it. Single-pass, not
    /// restartable.
    pub fn scan(&mut self) -> Result<Scan<'_>> {
        Scan::new(self)
    }

    // =========================================================================
    // Index Lifecycle
    // =========================================================================

    /// Create an ordered index on the named integer field
    ///
    /// Populated by a full scan of live records; replaces any existing index
    /// on the field.
    pub fn create_ordered_index(&mut self, field: &str) -> Result<()> {
        let field_num = self.require_int_field(field)?;
        let mut index = FieldIndex::Ordered(OrderedIndex::new());
        self.populate_index(field_num, &mut index)?;
        tracing::info!(field, pairs = index.len(), "built ordered index");
        self.indexes[field_num] = Some(index);
        Ok(())
    }

    /// Create a hash index on the named integer field
    ///
    /// Populated by a full scan of live records; replaces any existing index
    /// on the field.
    pub fn create_hash_index(&mut self, field: &str) -> Result<()> {
        let field_num = self.require_int_field(field)?;
        let mut index = FieldIndex::Hash(HashIndex::new());
        self.populate_index(field_num, &mut index)?;
        tracing::info!(field, pairs = index.len(), "built hash index");
        self.indexes[field_num] = Some(index);
        Ok(())
    }

    /// Drop the index on the named field, if any
    ///
    /// Never touches record data; a no-op when no index is installed.
    pub fn delete_index(&mut self, field: &str) -> Result<()> {
        let field_num = self
            .schema
            .field_index(field)
            .ok_or_else(|| HeapError::UnknownField(field.to_string()))?;
        if self.indexes[field_num].take().is_some() {
            tracing::debug!(field, "dropped index");
        }
        Ok(())
    }

    /// The index installed on the named field, if any
    pub fn index(&self, field: &str) -> Option<&FieldIndex> {
        let field_num = self.schema.field_index(field)?;
        self.indexes[field_num].as_ref()
    }

    /// Resolve `field` and require it to be integer-typed
    fn require_int_field(&self, field: &str) -> Result<usize> {
        let field_num = self
            .schema
            .field_index(field)
            .ok_or_else(|| HeapError::UnknownField(field.to_string()))?;
        if self.schema.field(field_num).ty() != FieldType::Int {
            return Err(HeapError::FieldTypeMismatch {
                field: field.to_string(),
            });
        }
        Ok(field_num)
    }

    /// Fill `index` with (field value, block) for every live record
    fn populate_index(&mut self, field: usize, index: &mut FieldIndex) -> Result<()> {
        self.file.read(BITMAP_BLOCK, &mut self.block_map_buf)?;
        let last = self.file.last_block()?.unwrap_or(BITMAP_BLOCK);

        for block in FIRST_DATA_BLOCK..=last {
            self.file.read(block, &mut self.buf)?;
            for slot in 0..self.layout.slots() {
                let occupied =
                    Bitmap::new(&mut self.buf[..self.layout.rec_map_size]).get(slot);
                if !occupied {
                    continue;
                }
                let rec = self
                    .schema
                    .read_record(&self.buf, self.layout.slot_offset(slot));
                index.insert(self.schema.int_value(&rec, field)?, block);
            }
        }
        Ok(())
    }

    /// Index maintenance after placing `rec` in `block`
    fn index_insert(&mut self, rec: &Record, block: u32) -> Result<()> {
        for (field, slot) in self.indexes.iter_mut().enumerate() {
            if let Some(index) = slot {
                index.insert(self.schema.int_value(rec, field)?, block);
            }
        }
        Ok(())
    }

    /// Index maintenance after removing `rec` from `block`
    ///
    /// Block-granular: removes (value, block) even if other records in the
    /// block still match — the caller orchestrates one delete per removed
    /// record.
    fn index_delete(&mut self, rec: &Record, block: u32) -> Result<()> {
        for (field, slot) in self.indexes.iter_mut().enumerate() {
            if let Some(index) = slot {
                index.delete(self.schema.int_value(rec, field)?, block);
            }
        }
        Ok(())
    }

    // =========================================================================
    // Diagnostics
    // =========================================================================

    /// Render the block bitmap, per-block record bitmaps and live records
    pub fn dump(&mut self) -> Result<String> {
        self.file.read(BITMAP_BLOCK, &mut self.block_map_buf)?;
        let last = self.file.last_block()?.unwrap_or(BITMAP_BLOCK);

        let mut out = String::new();
        let mut bits = String::new();
        {
            let block_map = Bitmap::new(&mut self.block_map_buf);
            for i in 0..=last as usize {
                bits.push(if block_map.get(i) { '1' } else { '0' });
            }
        }
        out.push_str(&format!("block bitmap: {}\n", bits));

        for block in FIRST_DATA_BLOCK..=last {
            self.file.read(block, &mut self.buf)?;
            let rec_bits =
                Bitmap::new(&mut self.buf[..self.layout.rec_map_size]).to_string();
            out.push_str(&format!("block {}\nrecord bitmap: {}\n", block, rec_bits));
            for slot in 0..self.layout.slots() {
                let occupied =
                    Bitmap::new(&mut self.buf[..self.layout.rec_map_size]).get(slot);
                if occupied {
                    let rec = self
                        .schema
                        .read_record(&self.buf, self.layout.slot_offset(slot));
                    out.push_str(&format!("  {}\n", rec));
                }
            }
        }
        Ok(out)
    }
}
