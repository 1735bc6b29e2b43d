//! Tag and Data Memories.
//!
//! This module models the two synchronous RAMs of the cache. It provides:
//! 1. **Tag Memory:** One `{tag, dirty}` entry per line.
//! 2. **Data Memory:** One backing-store-width block per line, written under a granule mask.
//! 3. **Registered Read Ports:** A read enabled in one cycle is visible the next.
//!
//! Both read ports are non-transparent: when a write and a read target the same
//! line on the same clock edge, the read captures the value from before the write.

use crate::common::addr::low_mask;

/// Contents of one tag memory entry.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct TagEntry {
    /// Tag of the block held by the line.
    pub tag: u64,
    /// The line holds the only up-to-date copy of its block.
    pub dirty: bool,
}

/// Snapshot of a full cache line, for inspection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheLine {
    /// Tag of the block held by the line.
    pub tag: u64,
    /// The line must be flushed before reuse.
    pub dirty: bool,
    /// Block contents, little-endian.
    pub data: Vec<u8>,
}

/// Tag memory with a registered, non-transparent read port.
#[derive(Clone, Debug)]
pub struct TagMemory {
    cells: Vec<TagEntry>,
    rdata: TagEntry,
}

impl TagMemory {
    /// Creates a tag memory of `lines` entries, all equal to `init`.
    ///
    /// The read register starts out holding line 0.
    pub fn new(lines: usize, init: TagEntry) -> Self {
        Self {
            cells: vec![init; lines],
            rdata: init,
        }
    }

    /// Registered read port output: the entry loaded at the last enabled read.
    #[inline(always)]
    pub fn read_data(&self) -> TagEntry {
        self.rdata
    }

    /// Applies one clock edge.
    ///
    /// # Arguments
    ///
    /// * `read` - Line to load into the read register, if the read port is enabled.
    /// * `write` - Line and entry to store, if the write port is enabled.
    pub fn clock(&mut self, read: Option<usize>, write: Option<(usize, TagEntry)>) {
        if let Some(line) = read {
            self.rdata = self.cells[line];
        }
        if let Some((line, entry)) = write {
            self.cells[line] = entry;
        }
    }

    /// Current contents of `line`, bypassing the read port.
    pub fn peek(&self, line: usize) -> TagEntry {
        self.cells[line]
    }
}

/// One data memory write: a full-width block with a per-granule enable mask.
#[derive(Clone, Copy, Debug)]
pub struct DataWrite<'a> {
    /// Target line.
    pub line: usize,
    /// Full block, `line_bytes` long; only enabled granules are stored.
    pub data: &'a [u8],
    /// Granule enable mask, bit `i` covering bytes `[i * g, (i + 1) * g)`.
    pub mask: u64,
}

/// Data memory with a registered, non-transparent read port and granule write enables.
#[derive(Clone, Debug)]
pub struct DataMemory {
    cells: Vec<Vec<u8>>,
    rdata: Vec<u8>,
    granule_bytes: usize,
}

impl DataMemory {
    /// Creates a zero-filled data memory.
    ///
    /// # Arguments
    ///
    /// * `lines` - Number of lines.
    /// * `line_bytes` - Block size in bytes.
    /// * `granule_bytes` - Bytes covered by one write-enable bit.
    pub fn new(lines: usize, line_bytes: usize, granule_bytes: usize) -> Self {
        Self {
            cells: vec![vec![0; line_bytes]; lines],
            rdata: vec![0; line_bytes],
            granule_bytes,
        }
    }

    /// Registered read port output.
    #[inline(always)]
    pub fn read_data(&self) -> &[u8] {
        &self.rdata
    }

    /// Applies one clock edge; the read samples the pre-write contents.
    pub fn clock(&mut self, read: Option<usize>, write: Option<DataWrite<'_>>) {
        if let Some(line) = read {
            self.rdata.copy_from_slice(&self.cells[line]);
        }
        if let Some(w) = write {
            let cell = &mut self.cells[w.line];
            let granules = cell.len() / self.granule_bytes;
            for g in 0..granules {
                if w.mask & (1 << g) != 0 {
                    let span = g * self.granule_bytes..(g + 1) * self.granule_bytes;
                    cell[span.clone()].copy_from_slice(&w.data[span]);
                }
            }
        }
    }

    /// Current contents of `line`, bypassing the read port.
    pub fn peek(&self, line: usize) -> &[u8] {
        &self.cells[line]
    }

    /// Mask enabling every granule of a line.
    pub fn full_mask(&self) -> u64 {
        let granules = self.rdata.len() / self.granule_bytes;
        low_mask(granules as u32)
    }
}
