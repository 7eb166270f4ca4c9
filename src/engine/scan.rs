//! Sequential scan
//!
//! A standalone cursor over every live record in the file. The scan owns its
//! own block buffer instead of sharing the engine's scratch buffer, and it
//! holds an exclusive borrow of the engine, so no CRUD operation can
//! interleave with an active scan.

use crate::bitmap::Bitmap;
use crate::error::Result;
use crate::record::Record;

use super::{HeapFile, FIRST_DATA_BLOCK};

/// Single-pass iterator over live records, yielding `(block, record)`
pub struct Scan<'a> {
    db: &'a mut HeapFile,
    /// Private read buffer for the block under the cursor
    buf: Vec<u8>,
    /// Block under the cursor
    block: u32,
    /// Next slot to examine within the loaded block
    slot: usize,
    /// Whether `buf` holds the current block's contents yet
    loaded: bool,
    /// Last allocated block at scan start
    last: u32,
}

impl<'a> Scan<'a> {
    pub(super) fn new(db: &'a mut HeapFile) -> Result<Self> {
        let last = db.file.last_block()?.unwrap_or(FIRST_DATA_BLOCK - 1);
        let buf = db.file.new_buffer();
        Ok(Self {
            db,
            buf,
            block: FIRST_DATA_BLOCK,
            slot: 0,
            loaded: false,
            last,
        })
    }
}

impl Iterator for Scan<'_> {
    type Item = Result<(u32, Record)>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            // Terminal once the cursor passes the last allocated block
            if self.block > self.last {
                return None;
            }

            if !self.loaded {
                if let Err(e) = self.db.file.read(self.block, &mut self.buf) {
                    // Surface the error and stop
                    self.block = self.last + 1;
                    return Some(Err(e));
                }
                self.loaded = true;
                self.slot = 0;
            }

            // Next occupied slot in the loaded block
            let rec_map_size = self.db.layout.rec_map_size;
            while self.slot < self.db.layout.slots() {
                let occupied = Bitmap::new(&mut self.buf[..rec_map_size]).get(self.slot);
                if occupied {
                    let rec = self
                        .db
                        .schema
                        .read_record(&self.buf, self.db.layout.slot_offset(self.slot));
                    let item = (self.block, rec);
                    self.slot += 1;
                    return Some(Ok(item));
                }
                self.slot += 1;
            }

            // Block exhausted; move on
            self.block += 1;
            self.loaded = false;
        }
    }
}
