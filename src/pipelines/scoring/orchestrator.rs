// Round orchestration
//
// Drives the dispatch entry points for one batch of hits:
// - single-end: one Best pass over the hit queue
// - paired:     Anchor pass, build the opposite queue from the anchors that
//               met their threshold, then the Opposite pass
// - all:        one exhaustive pass into the alignment ring
//
// The hit arena and DP scratch are owned by the caller and reused across
// rounds.

use crate::core::alignment::executor::{BatchExecutor, RoundStats};
use crate::core::alignment::scoring::WORST_SCORE;
use crate::core::alignment::workspace::DpScratch;

use super::dispatch::{anchor_score_best, opposite_score_best, score_all, score_best};
use super::ring_buffer::AlignmentRing;
use super::state::{HitRecord, PairedState, PipelineState};

/// Counts reported by a single-end or exhaustive round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundSummary {
    pub stats: RoundStats,
    /// Queued hits holding a valid score after the round
    pub scored: usize,
}

/// Counts reported by a paired round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PairedRoundSummary {
    pub anchor: RoundStats,
    pub opposite: RoundStats,
    /// Anchors meeting their threshold (size of the opposite queue)
    pub anchors_scored: usize,
    /// Hits whose opposite mate met its threshold
    pub pairs_scored: usize,
}

fn count_scored(idx_queue: &[u32], hits: &[HitRecord], score: impl Fn(&HitRecord) -> i32) -> usize {
    idx_queue
        .iter()
        .filter_map(|&idx| hits.get(idx as usize))
        .filter(|hit| score(hit) != WORST_SCORE)
        .count()
}

/// Positions in `idx_queue` whose anchor score is valid.
pub fn build_opposite_queue(idx_queue: &[u32], hits: &[HitRecord]) -> Vec<u32> {
    idx_queue
        .iter()
        .enumerate()
        .filter(|(_, idx)| hits.get(**idx as usize).is_some_and(|h| h.score != WORST_SCORE))
        .map(|(pos, _)| pos as u32)
        .collect()
}

/// Best-score round for single-end reads.
pub fn run_single_end_round<E: BatchExecutor>(
    executor: &E,
    band_len: u32,
    state: PipelineState<'_>,
    hits: &mut [HitRecord],
    scratch: &mut DpScratch,
) -> RoundSummary {
    let stats = score_best(executor, band_len, state, hits, scratch);
    let scored = count_scored(state.idx_queue, hits, |h| h.score);

    log::debug!(
        "Single-end round: {} hits queued, {} scored, {} above the sentinel",
        stats.offered,
        stats.accepted,
        scored
    );
    RoundSummary { stats, scored }
}

/// Anchor then opposite pass for paired reads.
///
/// Queued hits have their score and opposite fields reset before the anchor
/// pass, so only anchors scored in this round reach the opposite pass.
pub fn run_paired_round<E: BatchExecutor>(
    executor: &E,
    band_len: u32,
    state: PairedState<'_>,
    hits: &mut [HitRecord],
    scratch: &mut DpScratch,
) -> PairedRoundSummary {
    let idx_queue = state.base.idx_queue;
    for &idx in idx_queue {
        if let Some(hit) = hits.get_mut(idx as usize) {
            *hit = HitRecord {
                mate: hit.mate,
                ..HitRecord::new(hit.read_id, hit.rc, hit.loc)
            };
        }
    }

    let anchor = anchor_score_best(executor, band_len, state, hits, scratch);

    let opposite_queue = build_opposite_queue(idx_queue, hits);
    log::debug!(
        "Anchor pass: {} hits queued, {} aligned, {} met the pair threshold",
        anchor.offered,
        anchor.accepted,
        opposite_queue.len()
    );

    let opposite = opposite_score_best(executor, state, &opposite_queue, hits, scratch);
    let pairs_scored = count_scored(idx_queue, hits, |h| h.opposite_score);

    log::debug!(
        "Opposite pass: {} anchors, {} aligned, {} pairs scored",
        opposite.offered,
        opposite.accepted,
        pairs_scored
    );

    PairedRoundSummary {
        anchor,
        opposite,
        anchors_scored: opposite_queue.len(),
        pairs_scored,
    }
}

/// Exhaustive round into `ring`; returns the accepted-alignment count.
pub fn run_all_round<E: BatchExecutor>(
    executor: &E,
    band_len: u32,
    state: PipelineState<'_>,
    hits: &mut [HitRecord],
    ring: &AlignmentRing,
    offset: u32,
    scratch: &mut DpScratch,
) -> u32 {
    let count = score_all(executor, band_len, state, hits, ring, offset, scratch);

    if count as usize > ring.capacity() {
        log::warn!(
            "Alignment ring overflow: {} alignments accepted, capacity {}; {} earliest entries overwritten",
            count,
            ring.capacity(),
            count as usize - ring.capacity()
        );
    } else {
        log::debug!("All round: {} alignments accepted", count);
    }
    count
}
