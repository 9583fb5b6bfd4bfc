//! Work-item contract between scoring streams and the batched DP executor.
//!
//! A scoring stream exposes `N = size()` logical work items. For every item
//! the executor calls `init_context`; accepted items get their pattern scored
//! against the genome window carried by the context, after which `output` is
//! called exactly once with the populated sink. Items are independent and may
//! run in any order or fully in parallel.
//!
//! Records (hit-queue entries) live in a flat arena owned by the caller.
//! `init_context` only reads the arena; `output` receives exclusive access to
//! the single record named by `ctx.idx`.

use super::scoring::{Aligner, ScoringScheme, WORST_SCORE};
use super::sink::AlignmentSink;

/// Half-open coordinate range of one read inside a concatenated read set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReadRange {
    pub begin: u32,
    pub end: u32,
}

impl ReadRange {
    pub fn new(begin: u32, end: u32) -> Self {
        Self { begin, end }
    }

    #[inline]
    pub fn len(&self) -> u32 {
        self.end.saturating_sub(self.begin)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.end <= self.begin
    }
}

/// Per-item scoring context, valid for one `init_context`/DP/`output` cycle.
#[derive(Debug, Clone)]
pub struct AlignmentContext<K> {
    /// Record index in the hit arena
    pub idx: u32,
    /// 0 = the stream's own read set, 1 = the opposite read set
    pub mate: u32,
    /// Pattern is the reverse complement of the read
    pub read_rc: bool,
    pub read_id: u32,
    pub read_range: ReadRange,
    /// Genome window [genome_begin, genome_end)
    pub genome_begin: u32,
    pub genome_end: u32,
    pub min_score: i32,
    pub sink: K,
}

impl<K: Default> Default for AlignmentContext<K> {
    fn default() -> Self {
        Self {
            idx: 0,
            mate: 0,
            read_rc: false,
            read_id: 0,
            read_range: ReadRange::default(),
            genome_begin: 0,
            genome_end: 0,
            min_score: WORST_SCORE,
            sink: K::default(),
        }
    }
}

impl<K> AlignmentContext<K> {
    #[inline]
    pub fn read_len(&self) -> u32 {
        self.read_range.len()
    }

    #[inline]
    pub fn window_len(&self) -> u32 {
        self.genome_end.saturating_sub(self.genome_begin)
    }
}

/// A batch of independent alignment-scoring work items.
pub trait ScoringStream: Sync {
    /// Local or end-to-end kernel specialisation
    type Aligner: Aligner;
    /// What the kernel accumulates per item
    type Sink: AlignmentSink;
    /// Arena element written back by `output`
    type Record: Send + Sync;

    /// Cost model used by the kernel for every item of the stream
    fn scheme(&self) -> &ScoringScheme;

    /// Number of logical work items in the round
    fn size(&self) -> usize;

    /// Upper bound on any item's pattern (read) length
    fn max_pattern_length(&self) -> u32;

    /// Upper bound on any item's text (genome window) length
    fn max_text_length(&self) -> u32;

    /// Populate `ctx` for item `i`; returns false to skip the item.
    fn init_context(
        &self,
        i: usize,
        records: &[Self::Record],
        ctx: &mut AlignmentContext<Self::Sink>,
    ) -> bool;

    /// Write the result of accepted item `i` back to its record.
    fn output(&self, i: usize, ctx: &AlignmentContext<Self::Sink>, record: &mut Self::Record);

    /// Forward-strand encoded bases of the read named by `ctx`
    fn pattern(&self, ctx: &AlignmentContext<Self::Sink>) -> &[u8];

    /// Encoded genome bases of the window named by `ctx`
    fn text(&self, ctx: &AlignmentContext<Self::Sink>) -> &[u8];
}
