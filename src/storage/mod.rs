use std::fmt::Debug;

use serde::Deserialize;

use crate::buffer::page::{PageId, FRAME_SIZE};
use crate::error::{Error, Result};

pub mod disk;
pub mod memory;

/// A page store reads and writes fixed size pages addressed by page id.
/// Pages are numbered contiguously from zero, a new page is always appended
/// after the last one.
///
/// The PageStore trait is designed as `trait object` compatible so the
/// buffer manager can hold any backend behind a `Box<dyn PageStore>`.
pub trait PageStore: Debug {
    /// Read the page into `buf`, which must be exactly one frame long.
    fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<()>;

    /// Overwrite the page with `buf`, which must be exactly one frame long.
    fn write_page(&mut self, page_id: PageId, buf: &[u8]) -> Result<()>;

    /// Append a new page and return its id, ids grow monotonically from zero.
    fn allocate_page(&mut self) -> Result<PageId>;

    /// Number of pages currently held by the store.
    fn num_pages(&self) -> u32;

    /// Mark whether a page is in use by the upper layers. The store only keeps
    /// the bit, it never interprets it.
    fn set_use(&mut self, page_id: PageId, in_use: bool) -> Result<()>;

    fn get_use(&self, page_id: PageId) -> Result<bool>;

    /// Flushes any buffered data to the underlying storage medium.
    fn sync(&mut self) -> Result<()>;
}

#[derive(Copy, Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreType {
    Disk,
    Memory,
}

/// Open a store of the given type. The path is ignored for memory stores.
pub fn new_store(typ: StoreType, path: &str) -> Result<Box<dyn PageStore>> {
    match typ {
        StoreType::Disk => Ok(Box::new(disk::FileStore::open(path)?)),
        StoreType::Memory => Ok(Box::new(memory::MemoryStore::new())),
    }
}

pub(crate) fn check_bounds(page_id: PageId, num_pages: u32) -> Result<()> {
    if page_id >= num_pages {
        return Err(Error::OutOfBounds { page_id, num_pages });
    }
    Ok(())
}

pub(crate) fn check_len(len: usize) -> Result<()> {
    if len != FRAME_SIZE {
        return Err(Error::ContractViolation(format!(
            "buffer size {} does not match frame size {}",
            len, FRAME_SIZE
        )));
    }
    Ok(())
}
