use std::fmt::{Debug, Display, Formatter};
use std::str::FromStr;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Deserialize;

use super::page::{ControlEntry, FrameId, INVALID_FRAME_ID};
use crate::error::{Error, Result};

/// Replacer tracks frame usage and picks a victim frame once the buffer pool
/// has no free frame left.
pub trait Replacer: Debug {
    fn name(&self) -> &'static str;

    /// Seed the policy local state. Called once by the buffer manager
    /// before the first access.
    fn init(&mut self);

    /// Record an access to the given frame. `was_free` tells whether the frame
    /// was just taken from the free list.
    fn update(&mut self, frame_id: FrameId, was_free: bool);

    /// Pick a frame to evict. Only resident, unpinned entries of the control
    /// table are candidates. The replacer does not touch the page mapping, the
    /// buffer manager unlinks the victim from the hash index and then calls
    /// `update`. If the eviction fails `update` is not called.
    ///
    /// Return None if no frame can be evicted.
    fn select_victim(&mut self, entries: &[ControlEntry]) -> Option<FrameId>;
}

/// Replacement policy selected when the buffer manager is constructed.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum PolicyKind {
    /// Least recently used.
    Lru,
    /// Approximate recency, second chance clock.
    Clock,
    Random,
}

impl PolicyKind {
    pub fn build(&self, pool_size: usize, seed: u64) -> Box<dyn Replacer> {
        match self {
            PolicyKind::Lru => Box::new(LruReplacer::new(pool_size)),
            PolicyKind::Clock => Box::new(ClockReplacer::new(pool_size)),
            PolicyKind::Random => Box::new(RandomReplacer::new(pool_size, seed)),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "lru" | "recency" => Ok(PolicyKind::Lru),
            "clock" | "approx-recency" => Ok(PolicyKind::Clock),
            "random" => Ok(PolicyKind::Random),
            other => Err(Error::Config(format!("unknown replacement policy: {}", other))),
        }
    }
}

impl TryFrom<String> for PolicyKind {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

impl Display for PolicyKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            PolicyKind::Lru => "lru",
            PolicyKind::Clock => "clock",
            PolicyKind::Random => "random",
        };
        write!(f, "{}", s)
    }
}

/// LruReplacer keeps every tracked frame in a doubly linked list ordered
/// from least to most recently used. Links are frame ids.
#[derive(Debug)]
pub struct LruReplacer {
    prev: Vec<FrameId>,
    next: Vec<FrameId>,
    tracked: Vec<bool>,
    /// least recently used end.
    head: FrameId,
    /// most recently used end.
    tail: FrameId,
}

impl LruReplacer {
    pub fn new(pool_size: usize) -> Self {
        LruReplacer {
            prev: vec![INVALID_FRAME_ID; pool_size],
            next: vec![INVALID_FRAME_ID; pool_size],
            tracked: vec![false; pool_size],
            head: INVALID_FRAME_ID,
            tail: INVALID_FRAME_ID,
        }
    }

    fn unlink(&mut self, frame_id: FrameId) {
        let (p, n) = (self.prev[frame_id], self.next[frame_id]);
        if p == INVALID_FRAME_ID {
            self.head = n;
        } else {
            self.next[p] = n;
        }
        if n == INVALID_FRAME_ID {
            self.tail = p;
        } else {
            self.prev[n] = p;
        }
        self.prev[frame_id] = INVALID_FRAME_ID;
        self.next[frame_id] = INVALID_FRAME_ID;
        self.tracked[frame_id] = false;
    }

    fn push_back(&mut self, frame_id: FrameId) {
        self.prev[frame_id] = self.tail;
        self.next[frame_id] = INVALID_FRAME_ID;
        if self.tail == INVALID_FRAME_ID {
            self.head = frame_id;
        } else {
            self.next[self.tail] = frame_id;
        }
        self.tail = frame_id;
        self.tracked[frame_id] = true;
    }

    /// Frames from least to most recently used.
    #[cfg(test)]
    fn order(&self) -> Vec<FrameId> {
        let mut ans = vec![];
        let mut cur = self.head;
        while cur != INVALID_FRAME_ID {
            ans.push(cur);
            cur = self.next[cur];
        }
        ans
    }
}

impl Replacer for LruReplacer {
    fn name(&self) -> &'static str {
        "lru"
    }

    fn init(&mut self) {
        self.prev.fill(INVALID_FRAME_ID);
        self.next.fill(INVALID_FRAME_ID);
        self.tracked.fill(false);
        self.head = INVALID_FRAME_ID;
        self.tail = INVALID_FRAME_ID;
    }

    fn update(&mut self, frame_id: FrameId, _was_free: bool) {
        if frame_id >= self.tracked.len() {
            return;
        }
        if self.tracked[frame_id] {
            self.unlink(frame_id);
        }
        self.push_back(frame_id);
    }

    /// The victim keeps its place until the manager reports the frame's new
    /// occupant through `update`.
    fn select_victim(&mut self, entries: &[ControlEntry]) -> Option<FrameId> {
        let mut cur = self.head;
        while cur != INVALID_FRAME_ID {
            if entries[cur].is_evictable() {
                return Some(cur);
            }
            cur = self.next[cur];
        }
        None
    }
}

/// ClockReplacer approximates LRU with one reference bit per frame and a hand
/// sweeping over all frames in a circle.
///
/// An access sets the bit of the frame. When looking for a victim the hand
/// clears set bits as it passes and stops at the first unpinned frame whose
/// bit is already clear. Pinned frames are skipped and keep their bit.
#[derive(Debug)]
pub struct ClockReplacer {
    ref_bits: Vec<bool>,
    hand: FrameId,
}

impl ClockReplacer {
    pub fn new(pool_size: usize) -> Self {
        ClockReplacer { ref_bits: vec![false; pool_size], hand: 0 }
    }

    fn advance(&mut self) {
        self.hand = (self.hand + 1) % self.ref_bits.len();
    }
}

impl Replacer for ClockReplacer {
    fn name(&self) -> &'static str {
        "clock"
    }

    fn init(&mut self) {
        self.ref_bits.fill(false);
        self.hand = 0;
    }

    fn update(&mut self, frame_id: FrameId, _was_free: bool) {
        if let Some(bit) = self.ref_bits.get_mut(frame_id) {
            *bit = true;
        }
    }

    fn select_victim(&mut self, entries: &[ControlEntry]) -> Option<FrameId> {
        if self.ref_bits.is_empty() {
            return None;
        }
        // the first revolution may only clear bits, the second must find a
        // victim unless every frame is pinned.
        for _ in 0..2 * self.ref_bits.len() {
            let frame_id = self.hand;
            self.advance();
            if !entries[frame_id].is_evictable() {
                continue;
            }
            if self.ref_bits[frame_id] {
                self.ref_bits[frame_id] = false;
                continue;
            }
            return Some(frame_id);
        }
        None
    }
}

/// RandomReplacer picks a victim uniformly among the evictable frames.
#[derive(Debug)]
pub struct RandomReplacer {
    seed: u64,
    rng: StdRng,
    pool_size: usize,
}

impl RandomReplacer {
    pub fn new(pool_size: usize, seed: u64) -> Self {
        RandomReplacer { seed, rng: StdRng::seed_from_u64(seed), pool_size }
    }
}

impl Replacer for RandomReplacer {
    fn name(&self) -> &'static str {
        "random"
    }

    fn init(&mut self) {
        self.rng = StdRng::seed_from_u64(self.seed);
    }

    fn update(&mut self, _frame_id: FrameId, _was_free: bool) {}

    fn select_victim(&mut self, entries: &[ControlEntry]) -> Option<FrameId> {
        let candidates: Vec<FrameId> = entries
            .iter()
            .take(self.pool_size)
            .filter(|e| e.is_evictable())
            .map(|e| e.frame_id)
            .collect();
        candidates.choose(&mut self.rng).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A control table where every frame holds a page and none is pinned.
    fn resident(n: usize) -> Vec<ControlEntry> {
        (0..n)
            .map(|i| {
                let mut e = ControlEntry::new(i);
                e.page_id = Some(i as u32 * 10);
                e
            })
            .collect()
    }

    #[test]
    fn test_policy_kind_parse() -> Result<()> {
        assert_eq!(PolicyKind::Lru, "LRU".parse()?);
        assert_eq!(PolicyKind::Clock, "clock".parse()?);
        assert_eq!(PolicyKind::Random, "Random".parse()?);
        assert!(matches!("fifo".parse::<PolicyKind>(), Err(Error::Config(_))));
        assert_eq!("clock", PolicyKind::Clock.build(4, 0).name());
        Ok(())
    }

    #[test]
    fn test_lru_replacer() {
        let mut entries = resident(4);
        let mut lru = LruReplacer::new(4);
        lru.init();
        for f in 0..4 {
            lru.update(f, true);
        }
        lru.update(0, false);
        assert_eq!(vec![1, 2, 3, 0], lru.order());

        // pinned frames are passed over, nothing moves until the next update
        entries[1].pin_count = 1;
        assert_eq!(Some(2), lru.select_victim(&entries));
        assert_eq!(vec![1, 2, 3, 0], lru.order());
        assert_eq!(Some(2), lru.select_victim(&entries));

        lru.update(2, false);
        assert_eq!(vec![1, 3, 0, 2], lru.order());
        assert_eq!(Some(3), lru.select_victim(&entries));

        for e in entries.iter_mut() {
            e.pin_count = 1;
        }
        assert_eq!(None, lru.select_victim(&entries));
    }

    #[test]
    fn test_clock_replacer() {
        let mut entries = resident(4);
        let mut clock = ClockReplacer::new(4);
        clock.init();
        clock.update(1, false);
        clock.update(3, false);
        entries[1].pin_count = 1;
        entries[3].pin_count = 1;

        // frame 0 has a clear bit and sits under the hand
        assert_eq!(Some(0), clock.select_victim(&entries));
        assert_eq!(1, clock.hand);
        // pinned frame 1 is skipped, frame 2 is next
        assert_eq!(Some(2), clock.select_victim(&entries));
        assert_eq!(3, clock.hand);
        assert!(clock.ref_bits[1]);
    }

    #[test]
    fn test_clock_second_chance() {
        let entries = resident(3);
        let mut clock = ClockReplacer::new(3);
        for f in 0..3 {
            clock.update(f, true);
        }
        // every bit set: one revolution clears them, then frame 0 goes
        assert_eq!(Some(0), clock.select_victim(&entries));
        clock.update(0, false);
        assert_eq!(Some(1), clock.select_victim(&entries));
        assert_eq!(Some(2), clock.select_victim(&entries));
        // frame 0 was referenced again, frame 1 was not
        assert_eq!(Some(1), clock.select_victim(&entries));
    }

    #[test]
    fn test_clock_all_pinned() {
        let mut entries = resident(3);
        for e in entries.iter_mut() {
            e.pin_count = 2;
        }
        let mut clock = ClockReplacer::new(3);
        assert_eq!(None, clock.select_victim(&entries));
    }

    #[test]
    fn test_random_replacer() {
        let mut entries = resident(8);
        for f in [0, 2, 4, 6, 7] {
            entries[f].pin_count = 1;
        }
        entries[5].page_id = None;

        let mut a = RandomReplacer::new(8, 2023);
        let mut b = RandomReplacer::new(8, 2023);
        for _ in 0..64 {
            let victim = a.select_victim(&entries);
            assert!(matches!(victim, Some(1) | Some(3)));
            assert_eq!(victim, b.select_victim(&entries));
        }

        // reseeding replays the same sequence
        a.init();
        let mut fresh = RandomReplacer::new(8, 2023);
        let replay: Vec<_> = (0..16).map(|_| a.select_victim(&entries)).collect();
        let expect: Vec<_> = (0..16).map(|_| fresh.select_victim(&entries)).collect();
        assert_eq!(expect, replay);

        entries[1].pin_count = 1;
        entries[3].pin_count = 1;
        assert_eq!(None, a.select_victim(&entries));
    }
}
