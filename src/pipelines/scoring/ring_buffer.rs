// Bounded ring of accepted alignments for exhaustive ("all") rounds
//
// Accepted items claim a slot with an atomic post-increment of a round
// counter and write (read id, alignment) at (offset + slot) % capacity. The
// counter may run past the capacity: later slots then overwrite earlier
// ones, and the ring keeps only the most recent `capacity` allocations.
//
// Each physical entry remembers the sequence number (offset + slot) that
// wrote it and only accepts writes with a later one, so racing writers that
// land on the same entry after wraparound always leave the most recent
// allocation behind. Successive rounds sharing a ring must advance `offset`
// by at least the previous round's count.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use super::state::Alignment;

/// Round-scoped allocation counter.
#[derive(Debug, Default)]
pub struct RoundCounter(AtomicU32);

impl RoundCounter {
    pub fn new() -> Self {
        Self(AtomicU32::new(0))
    }

    /// Claim the next slot
    #[inline]
    pub fn fetch_next(&self) -> u32 {
        self.0.fetch_add(1, Ordering::Relaxed)
    }

    /// Slots claimed so far
    pub fn get(&self) -> u32 {
        self.0.load(Ordering::Acquire)
    }
}

#[derive(Debug, Clone, Copy)]
struct RingEntry {
    seq: Option<u64>,
    read_id: u32,
    alignment: Alignment,
}

impl Default for RingEntry {
    fn default() -> Self {
        Self {
            seq: None,
            read_id: u32::MAX,
            alignment: Alignment::invalid(),
        }
    }
}

/// Fixed-capacity ring of (read id, alignment) pairs.
#[derive(Debug)]
pub struct AlignmentRing {
    entries: Vec<Mutex<RingEntry>>,
}

impl AlignmentRing {
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: (0..capacity).map(|_| Mutex::new(RingEntry::default())).collect(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    fn position(&self, offset: u32, slot: u32) -> usize {
        ((offset as u64 + slot as u64) % self.entries.len() as u64) as usize
    }

    fn entry(&self, k: usize) -> RingEntry {
        *self.entries[k].lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Claim a slot from `counter` and store the pair; returns the slot.
    pub fn push(&self, counter: &RoundCounter, offset: u32, read_id: u32, alignment: Alignment) -> u32 {
        let slot = counter.fetch_next();
        if self.entries.is_empty() {
            return slot;
        }

        let seq = offset as u64 + slot as u64;
        let k = self.position(offset, slot);
        let mut entry = self.entries[k].lock().unwrap_or_else(|e| e.into_inner());
        if entry.seq.is_none_or(|prev| prev < seq) {
            *entry = RingEntry {
                seq: Some(seq),
                read_id,
                alignment,
            };
        }
        slot
    }

    /// Read ids by physical position
    pub fn read_ids(&self) -> Vec<u32> {
        (0..self.capacity()).map(|k| self.entry(k).read_id).collect()
    }

    /// Alignments by physical position
    pub fn alignments(&self) -> Vec<Alignment> {
        (0..self.capacity()).map(|k| self.entry(k).alignment).collect()
    }

    /// Entries surviving a round of `count` allocations written at `offset`,
    /// oldest first.
    pub fn latest(&self, count: u32, offset: u32) -> Vec<(u32, Alignment)> {
        if self.entries.is_empty() {
            return Vec::new();
        }
        let first = count.saturating_sub(self.capacity().min(u32::MAX as usize) as u32);
        (first..count)
            .map(|slot| {
                let e = self.entry(self.position(offset, slot));
                (e.read_id, e.alignment)
            })
            .collect()
    }

    /// Forget every entry
    pub fn clear(&mut self) {
        for entry in &mut self.entries {
            *entry.get_mut().unwrap_or_else(|e| e.into_inner()) = RingEntry::default();
        }
    }
}
