use std::sync::{Arc, Mutex};

use super::{check_bounds, check_len, PageStore};
use crate::buffer::page::{PageId, FRAME_SIZE};
use crate::error::{Error, Result};

#[derive(Debug, Default)]
struct Inner {
    pages: Vec<Vec<u8>>,
    in_use: Vec<bool>,
    reads: u64,
    writes: u64,
}

/// In-memory page store. Clones share the same pages, so a test can keep a
/// handle and observe the calls issued by the buffer manager.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> MemoryStore {
        MemoryStore::default()
    }

    /// A store already holding `n` zeroed pages.
    pub fn with_pages(n: u32) -> MemoryStore {
        let inner = Inner {
            pages: vec![vec![0u8; FRAME_SIZE]; n as usize],
            in_use: vec![true; n as usize],
            ..Default::default()
        };
        MemoryStore { inner: Arc::new(Mutex::new(inner)) }
    }

    /// Number of `read_page` calls served so far.
    pub fn reads(&self) -> Result<u64> {
        Ok(self.inner.lock()?.reads)
    }

    /// Number of `write_page` calls served so far.
    pub fn writes(&self) -> Result<u64> {
        Ok(self.inner.lock()?.writes)
    }

    /// Copy of the stored bytes of a page.
    pub fn page(&self, page_id: PageId) -> Result<Option<Vec<u8>>> {
        Ok(self.inner.lock()?.pages.get(page_id as usize).cloned())
    }
}

impl PageStore for MemoryStore {
    fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<()> {
        check_len(buf.len())?;
        let mut inner = self.inner.lock()?;
        check_bounds(page_id, inner.pages.len() as u32)?;
        buf.copy_from_slice(&inner.pages[page_id as usize]);
        inner.reads += 1;
        Ok(())
    }

    fn write_page(&mut self, page_id: PageId, buf: &[u8]) -> Result<()> {
        check_len(buf.len())?;
        let mut inner = self.inner.lock()?;
        check_bounds(page_id, inner.pages.len() as u32)?;
        inner.pages[page_id as usize].copy_from_slice(buf);
        inner.writes += 1;
        Ok(())
    }

    fn allocate_page(&mut self) -> Result<PageId> {
        let mut inner = self.inner.lock()?;
        let page_id = PageId::try_from(inner.pages.len())
            .ok()
            .filter(|&id| id < PageId::MAX)
            .ok_or_else(|| Error::Internal("page ids exhausted".to_string()))?;
        inner.pages.push(vec![0u8; FRAME_SIZE]);
        inner.in_use.push(true);
        Ok(page_id)
    }

    fn num_pages(&self) -> u32 {
        match self.inner.lock() {
            Ok(inner) => inner.pages.len() as u32,
            Err(poisoned) => poisoned.into_inner().pages.len() as u32,
        }
    }

    fn set_use(&mut self, page_id: PageId, in_use: bool) -> Result<()> {
        let mut inner = self.inner.lock()?;
        check_bounds(page_id, inner.pages.len() as u32)?;
        inner.in_use[page_id as usize] = in_use;
        Ok(())
    }

    fn get_use(&self, page_id: PageId) -> Result<bool> {
        let inner = self.inner.lock()?;
        check_bounds(page_id, inner.pages.len() as u32)?;
        Ok(inner.in_use[page_id as usize])
    }

    fn sync(&mut self) -> Result<()> {
        Ok(())
    }
}
