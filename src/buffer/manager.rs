use log::{debug, info, warn};

use super::freelist::FreeList;
use super::hashindex::HashIndex;
use super::page::{ControlEntry, Frame, FrameId, PageId};
use super::replacer::{PolicyKind, Replacer};
use super::stats::Stats;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::storage::{new_store, PageStore};

/// How the caller intends to use a fixed page.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    /// The page will be modified, the frame is marked dirty.
    Write,
}

/// The buffer manager is responsible for moving pages back and forth between
/// the page store and a fixed set of in-memory frames.
///
/// Callers fix a page by id and get back the frame holding it, without
/// knowing whether the page was already resident or had to be read from the
/// store. A fixed page stays pinned until it is unfixed as many times as it
/// was fixed, and a pinned frame is never chosen for eviction.
#[derive(Debug)]
pub struct BufferManager {
    pool_size: usize,
    store: Box<dyn PageStore>,
    /// frame pool, the index is the FrameId.
    frames: Vec<Frame>,
    /// control table, index aligned with `frames`.
    entries: Vec<ControlEntry>,
    /// frames that don't hold any page.
    free_list: FreeList,
    /// page id to frame lookup.
    page_table: HashIndex,
    /// picks an unpinned frame for replacement once the free list is empty.
    replacer: Box<dyn Replacer>,
    policy: PolicyKind,
    stats: Stats,
}

impl BufferManager {
    pub fn new(
        store: Box<dyn PageStore>,
        pool_size: usize,
        policy: PolicyKind,
        seed: u64,
    ) -> Result<Self> {
        if pool_size == 0 {
            return Err(Error::Config("pool_size must be larger than zero".to_string()));
        }
        let frames = (0..pool_size).map(|_| Frame::new()).collect();
        let mut entries: Vec<ControlEntry> = (0..pool_size).map(ControlEntry::new).collect();
        // initially, every frame is on the free list
        let free_list = FreeList::with_all(&mut entries);
        let page_table = HashIndex::new(pool_size);
        let mut replacer = policy.build(pool_size, seed);
        replacer.init();
        info!(
            "buffer manager started, policy {}, {} frames, store holds {} pages",
            replacer.name(),
            pool_size,
            store.num_pages()
        );
        Ok(BufferManager {
            pool_size,
            store,
            frames,
            entries,
            free_list,
            page_table,
            replacer,
            policy,
            stats: Stats::default(),
        })
    }

    /// Open the configured page store and build a manager on top of it.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        cfg.validate()?;
        let store = new_store(cfg.store_type, &cfg.db_path)?;
        BufferManager::new(store, cfg.pool_size, cfg.policy, cfg.seed)
    }

    /// Fix the page in the buffer pool and return the frame holding it.
    ///
    /// On a miss a frame is taken from the free list or evicted by the
    /// replacer, writing the old page back first if it is dirty. In read mode
    /// the page is loaded from the store, in write mode the frame is zeroed and
    /// marked dirty since the caller is going to overwrite it.
    pub fn fix(&mut self, page_id: PageId, mode: AccessMode) -> Result<FrameId> {
        if let Some(frame_id) = self.page_table.find(&self.entries, page_id) {
            let entry = &mut self.entries[frame_id];
            entry.pin_count += 1;
            if mode == AccessMode::Write {
                entry.dirty = true;
                self.stats.writes += 1;
            }
            self.replacer.update(frame_id, false);
            self.stats.accesses += 1;
            self.stats.hits += 1;
            return Ok(frame_id);
        }

        // reject unknown pages before evicting anything for them.
        let num_pages = self.store.num_pages();
        if page_id >= num_pages {
            return Err(Error::OutOfBounds { page_id, num_pages });
        }

        let frame_id = self.select_victim()?;
        match mode {
            AccessMode::Write => {
                self.frames[frame_id].fill(0);
                self.entries[frame_id].dirty = true;
                self.stats.writes += 1;
            }
            AccessMode::Read => {
                if let Err(err) = self.store.read_page(page_id, &mut self.frames[frame_id]) {
                    self.discard(frame_id);
                    return Err(err);
                }
                self.stats.read_io += 1;
            }
        }
        self.install(frame_id, page_id);
        self.stats.accesses += 1;
        Ok(frame_id)
    }

    /// Allocate a new page in the store and fix it in a zeroed frame.
    pub fn fix_new(&mut self) -> Result<(PageId, FrameId)> {
        let frame_id = self.select_victim()?;
        let page_id = match self.store.allocate_page() {
            Ok(page_id) => page_id,
            Err(err) => {
                self.discard(frame_id);
                return Err(err);
            }
        };
        self.frames[frame_id].fill(0);
        self.install(frame_id, page_id);
        Ok((page_id, frame_id))
    }

    /// Release one pin on the page. Once the pin count drops to zero the
    /// frame becomes a candidate for replacement, the page stays resident.
    pub fn unfix(&mut self, page_id: PageId) -> Result<FrameId> {
        let frame_id = self.page_table.find(&self.entries, page_id).ok_or_else(|| {
            Error::ContractViolation(format!("unfix page {} which is not resident", page_id))
        })?;
        let entry = &mut self.entries[frame_id];
        if entry.pin_count == 0 {
            return Err(Error::ContractViolation(format!(
                "unfix page {} which is not pinned",
                page_id
            )));
        }
        entry.pin_count -= 1;
        Ok(frame_id)
    }

    pub fn num_free_frames(&self) -> usize {
        self.free_list.count()
    }

    /// Number of frames currently holding a page.
    pub fn resident_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_resident()).count()
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn policy(&self) -> PolicyKind {
        self.policy
    }

    pub fn stats(&self) -> Stats {
        self.stats
    }

    pub fn reset_stats(&mut self) {
        self.stats = Stats::default();
    }

    pub fn store(&self) -> &dyn PageStore {
        self.store.as_ref()
    }

    pub fn store_mut(&mut self) -> &mut dyn PageStore {
        self.store.as_mut()
    }

    /// Frame holding the page, if it is resident.
    pub fn frame_of(&self, page_id: PageId) -> Option<FrameId> {
        self.page_table.find(&self.entries, page_id)
    }

    /// Pin count of the page, if it is resident.
    pub fn pin_count(&self, page_id: PageId) -> Option<u32> {
        self.frame_of(page_id).map(|frame_id| self.entries[frame_id].pin_count)
    }

    pub fn frame(&self, frame_id: FrameId) -> Result<&[u8]> {
        self.check_frame(frame_id)?;
        Ok(&self.frames[frame_id][..])
    }

    /// Mutable access to the frame bytes. This does not mark the frame dirty,
    /// fix the page in write mode or call `set_dirty` for that.
    pub fn frame_mut(&mut self, frame_id: FrameId) -> Result<&mut [u8]> {
        self.check_frame(frame_id)?;
        Ok(&mut self.frames[frame_id][..])
    }

    pub fn is_dirty(&self, frame_id: FrameId) -> Result<bool> {
        self.check_frame(frame_id)?;
        Ok(self.entries[frame_id].dirty)
    }

    pub fn set_dirty(&mut self, frame_id: FrameId) -> Result<()> {
        self.check_resident(frame_id)?;
        self.entries[frame_id].dirty = true;
        Ok(())
    }

    /// Forget pending modifications, e.g. for a temporary page that must
    /// never reach the store.
    pub fn clear_dirty(&mut self, frame_id: FrameId) -> Result<()> {
        self.check_resident(frame_id)?;
        self.entries[frame_id].dirty = false;
        Ok(())
    }

    /// Write the page back if it is dirty. Return false if the page is not
    /// resident, true otherwise.
    pub fn flush_page(&mut self, page_id: PageId) -> Result<bool> {
        let Some(frame_id) = self.frame_of(page_id) else {
            return Ok(false);
        };
        if self.entries[frame_id].dirty {
            self.write_back(frame_id, page_id)?;
        }
        Ok(true)
    }

    /// Write every dirty frame back to the store and sync it. Return the
    /// number of pages written.
    pub fn flush_all(&mut self) -> Result<usize> {
        let mut written = 0;
        for frame_id in 0..self.pool_size {
            let entry = &self.entries[frame_id];
            if let (true, Some(page_id)) = (entry.dirty, entry.page_id) {
                self.write_back(frame_id, page_id)?;
                written += 1;
            }
        }
        self.store.sync()?;
        Ok(written)
    }

    /// Flush all dirty frames and shut down.
    pub fn close(mut self) -> Result<()> {
        let written = self.flush_all()?;
        info!("buffer manager closed, {} dirty pages written", written);
        Ok(())
    }

    /// Find a frame for a new occupant: the free list first, then a victim
    /// chosen by the replacer. The returned frame holds no page, the caller
    /// installs the new mapping.
    fn select_victim(&mut self) -> Result<FrameId> {
        if let Some(frame_id) = self.free_list.take(&mut self.entries) {
            self.replacer.update(frame_id, true);
            return Ok(frame_id);
        }

        let frame_id =
            self.replacer.select_victim(&self.entries).ok_or(Error::NoAvailableFrame)?;
        let entry = &self.entries[frame_id];
        let Some(old_page_id) = entry.page_id.filter(|_| entry.pin_count == 0) else {
            return Err(Error::Internal(format!(
                "replacer {} returned frame {} which is not evictable",
                self.replacer.name(),
                frame_id
            )));
        };

        let dirty = entry.dirty;
        if dirty {
            // on failure the page stays resident and the replacer untouched.
            self.write_back(frame_id, old_page_id)?;
        }
        debug!("evict page {} from frame {}, dirty {}", old_page_id, frame_id, dirty);
        self.page_table.remove(&mut self.entries, frame_id);
        self.entries[frame_id].clear();
        self.replacer.update(frame_id, false);
        Ok(frame_id)
    }

    fn install(&mut self, frame_id: FrameId, page_id: PageId) {
        let entry = &mut self.entries[frame_id];
        entry.page_id = Some(page_id);
        entry.pin_count = 1;
        self.page_table.insert(&mut self.entries, frame_id);
    }

    /// Give a frame that was taken for a failed load back to the free list.
    fn discard(&mut self, frame_id: FrameId) {
        self.entries[frame_id].clear();
        self.free_list.release(&mut self.entries, frame_id);
    }

    fn write_back(&mut self, frame_id: FrameId, page_id: PageId) -> Result<()> {
        self.store.write_page(page_id, &self.frames[frame_id])?;
        self.stats.write_io += 1;
        self.entries[frame_id].dirty = false;
        Ok(())
    }

    fn check_frame(&self, frame_id: FrameId) -> Result<()> {
        if frame_id >= self.pool_size {
            return Err(Error::ContractViolation(format!(
                "frame {} out of range, pool holds {} frames",
                frame_id, self.pool_size
            )));
        }
        Ok(())
    }

    fn check_resident(&self, frame_id: FrameId) -> Result<()> {
        self.check_frame(frame_id)?;
        if !self.entries[frame_id].is_resident() {
            return Err(Error::ContractViolation(format!("frame {} holds no page", frame_id)));
        }
        Ok(())
    }
}

impl Drop for BufferManager {
    fn drop(&mut self) {
        if !self.entries.iter().any(|e| e.dirty) {
            return;
        }
        if let Err(err) = self.flush_all() {
            warn!("failed to flush dirty pages on drop: {}", err);
        }
    }
}
