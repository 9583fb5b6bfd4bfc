//! Band-width dispatch.
//!
//! Requested band lengths are mapped onto a small set of fixed buckets and
//! each bucket selects its own `const BAND_LEN` specialisation of the
//! executor. The alignment mode selects the aligner type, so every
//! (stream, mode, bucket) combination is monomorphised.

use crate::core::alignment::executor::{BatchExecutor, RoundStats};
use crate::core::alignment::scoring::{Aligner, AlignmentMode, EndToEndAligner, LocalAligner};
use crate::core::alignment::stream::ScoringStream;
use crate::core::alignment::workspace::DpScratch;

use super::ring_buffer::{AlignmentRing, RoundCounter};
use super::state::{HitRecord, PairedState, PipelineState};
use super::streams::{AllScoreStream, AnchorScoreStream, BestScoreStream, OppositeScoreStream};

/// Supported band buckets, narrowest first
pub const BAND_BUCKETS: [u32; 4] = [3, 7, 15, 31];

/// Smallest supported bucket covering `band_len`; anything above 15 maps
/// to 31, including requests wider than 31.
#[inline]
pub fn band_bucket(band_len: u32) -> u32 {
    if band_len < 4 {
        3
    } else if band_len < 8 {
        7
    } else if band_len < 16 {
        15
    } else {
        31
    }
}

fn checked_bucket(band_len: u32) -> u32 {
    let bucket = band_bucket(band_len);
    if band_len > bucket {
        log::warn!(
            "Requested band length {} exceeds the widest kernel; scoring with band {}",
            band_len,
            bucket
        );
    }
    log::debug!("Band length {} -> bucket {}", band_len, bucket);
    bucket
}

/// Run `stream` on the executor specialisation for `bucket`.
fn enact_bucket<E, S>(
    executor: &E,
    bucket: u32,
    stream: &S,
    records: &mut [S::Record],
    scratch: &mut DpScratch,
) -> RoundStats
where
    E: BatchExecutor,
    S: ScoringStream,
{
    match bucket {
        3 => executor.enact_banded::<S, 3>(stream, records, scratch),
        7 => executor.enact_banded::<S, 7>(stream, records, scratch),
        15 => executor.enact_banded::<S, 15>(stream, records, scratch),
        _ => executor.enact_banded::<S, 31>(stream, records, scratch),
    }
}

fn banded_score_best<A: Aligner, E: BatchExecutor>(
    executor: &E,
    band_len: u32,
    state: PipelineState<'_>,
    hits: &mut [HitRecord],
    scratch: &mut DpScratch,
) -> RoundStats {
    let bucket = checked_bucket(band_len);
    let stream = BestScoreStream::<A>::new(state, bucket);
    enact_bucket(executor, bucket, &stream, hits, scratch)
}

fn banded_anchor_score_best<A: Aligner, E: BatchExecutor>(
    executor: &E,
    band_len: u32,
    state: PairedState<'_>,
    hits: &mut [HitRecord],
    scratch: &mut DpScratch,
) -> RoundStats {
    let bucket = checked_bucket(band_len);
    let stream = AnchorScoreStream::<A>::new(state, bucket);
    enact_bucket(executor, bucket, &stream, hits, scratch)
}

fn full_opposite_score_best<A: Aligner, E: BatchExecutor>(
    executor: &E,
    state: PairedState<'_>,
    opposite_queue: &[u32],
    hits: &mut [HitRecord],
    scratch: &mut DpScratch,
) -> RoundStats {
    let stream = OppositeScoreStream::<A>::new(state, opposite_queue);
    executor.enact_full(&stream, hits, scratch)
}

#[allow(clippy::too_many_arguments)]
fn banded_score_all<A: Aligner, E: BatchExecutor>(
    executor: &E,
    band_len: u32,
    state: PipelineState<'_>,
    hits: &mut [HitRecord],
    ring: &AlignmentRing,
    offset: u32,
    scratch: &mut DpScratch,
) -> u32 {
    let bucket = checked_bucket(band_len);
    let counter = RoundCounter::new();
    let stream = AllScoreStream::<A>::new(state, bucket, ring, offset, &counter);
    enact_bucket(executor, bucket, &stream, hits, scratch);
    counter.get()
}

/// Single-end best-score round over `state.idx_queue`.
pub fn score_best<E: BatchExecutor>(
    executor: &E,
    band_len: u32,
    state: PipelineState<'_>,
    hits: &mut [HitRecord],
    scratch: &mut DpScratch,
) -> RoundStats {
    match state.scheme.mode() {
        AlignmentMode::Local => banded_score_best::<LocalAligner, E>(executor, band_len, state, hits, scratch),
        AlignmentMode::EndToEnd => banded_score_best::<EndToEndAligner, E>(executor, band_len, state, hits, scratch),
    }
}

/// Anchor-mate pass of a paired round.
pub fn anchor_score_best<E: BatchExecutor>(
    executor: &E,
    band_len: u32,
    state: PairedState<'_>,
    hits: &mut [HitRecord],
    scratch: &mut DpScratch,
) -> RoundStats {
    match state.base.scheme.mode() {
        AlignmentMode::Local => banded_anchor_score_best::<LocalAligner, E>(executor, band_len, state, hits, scratch),
        AlignmentMode::EndToEnd => {
            banded_anchor_score_best::<EndToEndAligner, E>(executor, band_len, state, hits, scratch)
        }
    }
}

/// Opposite-mate pass of a paired round (full DP over each window).
///
/// `opposite_queue` holds positions into `state.base.idx_queue`.
pub fn opposite_score_best<E: BatchExecutor>(
    executor: &E,
    state: PairedState<'_>,
    opposite_queue: &[u32],
    hits: &mut [HitRecord],
    scratch: &mut DpScratch,
) -> RoundStats {
    match state.base.scheme.mode() {
        AlignmentMode::Local => {
            full_opposite_score_best::<LocalAligner, E>(executor, state, opposite_queue, hits, scratch)
        }
        AlignmentMode::EndToEnd => {
            full_opposite_score_best::<EndToEndAligner, E>(executor, state, opposite_queue, hits, scratch)
        }
    }
}

/// Exhaustive round: every alignment above the per-length worst score goes
/// to `ring` starting at `offset`. Returns the number of accepted
/// alignments, which may exceed the ring capacity.
#[allow(clippy::too_many_arguments)]
pub fn score_all<E: BatchExecutor>(
    executor: &E,
    band_len: u32,
    state: PipelineState<'_>,
    hits: &mut [HitRecord],
    ring: &AlignmentRing,
    offset: u32,
    scratch: &mut DpScratch,
) -> u32 {
    match state.scheme.mode() {
        AlignmentMode::Local => {
            banded_score_all::<LocalAligner, E>(executor, band_len, state, hits, ring, offset, scratch)
        }
        AlignmentMode::EndToEnd => {
            banded_score_all::<EndToEndAligner, E>(executor, band_len, state, hits, ring, offset, scratch)
        }
    }
}
