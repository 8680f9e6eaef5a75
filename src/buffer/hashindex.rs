use super::page::{ControlEntry, FrameId, PageId, INVALID_FRAME_ID};

/// Avalanche mix so that sequential page ids land in different buckets.
fn mix(page_id: PageId) -> u32 {
    let mut x = page_id;
    x = ((x >> 16) ^ x).wrapping_mul(0x45d9f3b);
    x = ((x >> 16) ^ x).wrapping_mul(0x45d9f3b);
    (x >> 16) ^ x
}

/// Chained hash table from page id to the control entry holding that page.
///
/// Buckets store the frame id of the chain head, chains continue through
/// `ControlEntry::hash_next`. The number of buckets equals the pool size and
/// chain length is unbounded.
#[derive(Debug)]
pub struct HashIndex {
    buckets: Vec<FrameId>,
}

impl HashIndex {
    pub fn new(num_buckets: usize) -> Self {
        assert!(num_buckets > 0, "hash index needs at least one bucket");
        HashIndex { buckets: vec![INVALID_FRAME_ID; num_buckets] }
    }

    fn bucket(&self, page_id: PageId) -> usize {
        mix(page_id) as usize % self.buckets.len()
    }

    pub fn find(&self, entries: &[ControlEntry], page_id: PageId) -> Option<FrameId> {
        let mut cur = self.buckets[self.bucket(page_id)];
        while cur != INVALID_FRAME_ID {
            if entries[cur].page_id == Some(page_id) {
                return Some(cur);
            }
            cur = entries[cur].hash_next;
        }
        None
    }

    /// Push the entry at the head of its bucket. The entry must carry its page id.
    pub fn insert(&mut self, entries: &mut [ControlEntry], frame_id: FrameId) {
        let Some(page_id) = entries[frame_id].page_id else {
            return;
        };
        let b = self.bucket(page_id);
        entries[frame_id].hash_next = self.buckets[b];
        self.buckets[b] = frame_id;
    }

    /// Unlink the entry from its bucket chain, wherever it sits in the chain.
    /// Returns false if the entry was not found.
    pub fn remove(&mut self, entries: &mut [ControlEntry], frame_id: FrameId) -> bool {
        let Some(page_id) = entries[frame_id].page_id else {
            return false;
        };
        let b = self.bucket(page_id);
        if self.buckets[b] == frame_id {
            self.buckets[b] = entries[frame_id].hash_next;
            entries[frame_id].hash_next = INVALID_FRAME_ID;
            return true;
        }
        let mut prev = self.buckets[b];
        while prev != INVALID_FRAME_ID {
            let next = entries[prev].hash_next;
            if next == frame_id {
                entries[prev].hash_next = entries[frame_id].hash_next;
                entries[frame_id].hash_next = INVALID_FRAME_ID;
                return true;
            }
            prev = next;
        }
        false
    }
}
