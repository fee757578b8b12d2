//! Two-generation paste key cache.
//!
//! `known` holds keys checked in earlier cycles; `seen_this_cycle` collects
//! every key observed in the current batch. At the end of a batch the current
//! generation is either merged into `known` or, once `flush_after` batch items
//! have been processed, replaces it. A flush lets old keys come back as new,
//! which bounds memory at the cost of possible duplicate matches.

use std::collections::HashSet;

/// What [`DedupCache::end_cycle`] did with the current generation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleEnd {
    Merged,
    Flushed,
}

#[derive(Debug, Clone)]
pub struct DedupCache {
    known: HashSet<String>,
    seen_this_cycle: HashSet<String>,
    processed: usize,
    flush_after: usize,
}

impl DedupCache {
    pub fn new(flush_after: usize) -> Self {
        Self {
            known: HashSet::new(),
            seen_this_cycle: HashSet::new(),
            processed: 0,
            flush_after: flush_after.max(1),
        }
    }

    /// Record a batch item. Returns `true` when the key was not known at the
    /// start of this cycle and must be checked.
    ///
    /// Every call counts toward the flush threshold, new key or not.
    pub fn observe(&mut self, key: &str) -> bool {
        self.processed += 1;
        self.seen_this_cycle.insert(key.to_string());
        !self.known.contains(key)
    }

    /// Fold the current generation into `known` and start a new one.
    pub fn end_cycle(&mut self) -> CycleEnd {
        let seen = std::mem::take(&mut self.seen_this_cycle);
        if self.processed >= self.flush_after {
            self.known = seen;
            self.processed = 0;
            CycleEnd::Flushed
        } else {
            self.known.extend(seen);
            CycleEnd::Merged
        }
    }

    pub fn is_known(&self, key: &str) -> bool {
        self.known.contains(key)
    }

    pub fn known_len(&self) -> usize {
        self.known.len()
    }

    /// Batch items counted since the last flush.
    pub fn processed(&self) -> usize {
        self.processed
    }
}
