use std::fmt::{Debug, Formatter};
use std::ops::{Deref, DerefMut};

pub type PageId = u32;

/// Index of a frame in the pool, i.e., in range [0, pool_size).
pub type FrameId = usize;

/// Size of a page on disk and of a frame in memory, in bytes.
pub const FRAME_SIZE: usize = 4096;

/// Sentinel link meaning "no next entry" in the intrusive lists.
pub const INVALID_FRAME_ID: FrameId = usize::MAX;

/// In-memory buffer holding the raw bytes of one page while resident.
pub struct Frame {
    data: Box<[u8]>,
}

impl Frame {
    pub fn new() -> Self {
        Frame { data: vec![0u8; FRAME_SIZE].into_boxed_slice() }
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}

impl Deref for Frame {
    type Target = [u8];

    fn deref(&self) -> &Self::Target {
        &self.data
    }
}

impl DerefMut for Frame {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.data
    }
}

impl Debug for Frame {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let head: Vec<String> = self.data.iter().take(16).map(|b| format!("{:02x}", b)).collect();
        write!(f, "Frame({} bytes, {}..)", self.data.len(), head.join(""))
    }
}

/// Buffer control block, one per frame and index aligned with the frame pool.
///
/// The entry is either free (on the free list, no page id) or resident
/// (reachable from the hash index under `page_id`). Links are frame ids
/// into the control table, `INVALID_FRAME_ID` terminates a chain.
#[derive(Debug, Clone)]
pub struct ControlEntry {
    pub page_id: Option<PageId>,
    pub frame_id: FrameId,
    /// Reserved for latching under concurrent access, unused for now.
    pub latch: u32,
    pub pin_count: u32,
    pub dirty: bool,
    /// Next entry in the same hash bucket.
    pub hash_next: FrameId,
    /// Next entry on the free list.
    pub free_next: FrameId,
}

impl ControlEntry {
    pub fn new(frame_id: FrameId) -> Self {
        ControlEntry {
            page_id: None,
            frame_id,
            latch: 0,
            pin_count: 0,
            dirty: false,
            hash_next: INVALID_FRAME_ID,
            free_next: INVALID_FRAME_ID,
        }
    }

    pub fn is_resident(&self) -> bool {
        self.page_id.is_some()
    }

    /// Whether a replacement policy may hand this entry out as a victim.
    pub fn is_evictable(&self) -> bool {
        self.is_resident() && self.pin_count == 0
    }

    /// Drop page identity and flags, keeping the frame id.
    pub fn clear(&mut self) {
        self.page_id = None;
        self.pin_count = 0;
        self.dirty = false;
        self.hash_next = INVALID_FRAME_ID;
        self.free_next = INVALID_FRAME_ID;
    }
}
