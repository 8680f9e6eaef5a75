use super::page::{ControlEntry, FrameId, INVALID_FRAME_ID};

/// Stack of frames holding no page, threaded through `ControlEntry::free_next`.
#[derive(Debug)]
pub struct FreeList {
    head: FrameId,
    count: usize,
}

impl FreeList {
    pub fn new() -> Self {
        FreeList { head: INVALID_FRAME_ID, count: 0 }
    }

    /// Build a free list holding every entry of the table, frame 0 on top.
    pub fn with_all(entries: &mut [ControlEntry]) -> Self {
        let mut list = FreeList::new();
        for frame_id in (0..entries.len()).rev() {
            list.release(entries, frame_id);
        }
        list
    }

    /// Pop the most recently released entry, if any.
    pub fn take(&mut self, entries: &mut [ControlEntry]) -> Option<FrameId> {
        if self.head == INVALID_FRAME_ID {
            return None;
        }
        let frame_id = self.head;
        self.head = entries[frame_id].free_next;
        entries[frame_id].free_next = INVALID_FRAME_ID;
        self.count -= 1;
        Some(frame_id)
    }

    /// Push an entry back. It must already be unlinked from the hash index.
    pub fn release(&mut self, entries: &mut [ControlEntry], frame_id: FrameId) {
        entries[frame_id].free_next = self.head;
        self.head = frame_id;
        self.count += 1;
    }

    pub fn count(&self) -> usize {
        self.count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(n: usize) -> Vec<ControlEntry> {
        (0..n).map(ControlEntry::new).collect()
    }

    #[test]
    fn test_free_list_lifo() {
        let mut entries = table(3);
        let mut list = FreeList::with_all(&mut entries);
        assert_eq!(3, list.count());

        assert_eq!(Some(0), list.take(&mut entries));
        assert_eq!(Some(1), list.take(&mut entries));
        assert_eq!(1, list.count());

        list.release(&mut entries, 0);
        assert_eq!(2, list.count());
        assert_eq!(Some(0), list.take(&mut entries));
        assert_eq!(Some(2), list.take(&mut entries));
        assert_eq!(None, list.take(&mut entries));
        assert_eq!(0, list.count());
    }
}
