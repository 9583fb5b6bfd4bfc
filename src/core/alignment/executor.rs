//! Batched execution of scoring streams.
//!
//! A `BatchExecutor` drives every work item of a stream through
//! `init_context` → DP → `output`. Implementations may schedule items in any
//! order; the only ordering guarantee is that an item's `output` runs after
//! its own DP.
//!
//! `ScalarBatchExecutor` is the reference CPU implementation: items are
//! scored in waves sized by the DP scratch arena, each wave in parallel over
//! rayon, and results are scattered back to their records in a second
//! parallel pass that hands every record to at most one item.

use rayon::prelude::*;

use super::kernel::score_window;
use super::sink::AlignmentSink;
use super::stream::{AlignmentContext, ScoringStream};
use super::workspace::{DpScratch, LaneBuffers, lane_len};
use crate::core::compute::encoding::complement_code;

/// Per-round accounting returned by the executor.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Logical work items in the stream
    pub offered: usize,
    /// Items whose `init_context` accepted them
    pub accepted: usize,
    /// Accepted items whose output was discarded (record clash or bad index)
    pub dropped: usize,
}

/// Executes a scoring stream over caller-provided records and scratch.
pub trait BatchExecutor: Sync {
    /// Banded DP; `BAND_LEN` is the number of diagonals beyond the main one
    fn enact_banded<S: ScoringStream, const BAND_LEN: u32>(
        &self,
        stream: &S,
        records: &mut [S::Record],
        scratch: &mut DpScratch,
    ) -> RoundStats;

    /// Full-matrix DP over the whole window
    fn enact_full<S: ScoringStream>(
        &self,
        stream: &S,
        records: &mut [S::Record],
        scratch: &mut DpScratch,
    ) -> RoundStats;
}

/// Reference executor: scalar kernel, rayon-parallel waves.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScalarBatchExecutor;

impl BatchExecutor for ScalarBatchExecutor {
    fn enact_banded<S: ScoringStream, const BAND_LEN: u32>(
        &self,
        stream: &S,
        records: &mut [S::Record],
        scratch: &mut DpScratch,
    ) -> RoundStats {
        run_stream(stream, records, scratch, Some(BAND_LEN))
    }

    fn enact_full<S: ScoringStream>(
        &self,
        stream: &S,
        records: &mut [S::Record],
        scratch: &mut DpScratch,
    ) -> RoundStats {
        run_stream(stream, records, scratch, None)
    }
}

fn run_stream<S: ScoringStream>(
    stream: &S,
    records: &mut [S::Record],
    scratch: &mut DpScratch,
    band: Option<u32>,
) -> RoundStats {
    let n = stream.size();
    let mut stats = RoundStats {
        offered: n,
        ..Default::default()
    };
    if n == 0 {
        return stats;
    }

    let max_p = stream.max_pattern_length();
    let max_t = stream.max_text_length();
    let lane = lane_len(max_p, max_t);
    let lanes = scratch.lanes(lane);
    if lanes == 0 {
        log::error!(
            "DP scratch of {} cells cannot hold a single lane of {} cells (pattern {}, text {}); skipping {} items",
            scratch.capacity(),
            lane,
            max_p,
            max_t,
            n
        );
        return stats;
    }

    log::debug!(
        "Scoring {} items in waves of {} (band {:?}, pattern <= {}, text <= {})",
        n,
        lanes,
        band,
        max_p,
        max_t
    );

    let mut accepted: Vec<(usize, AlignmentContext<S::Sink>)> = Vec::new();
    {
        let shared: &[S::Record] = records;
        let mut wave_start = 0;
        while wave_start < n {
            let wave = (n - wave_start).min(lanes);
            let results: Vec<Option<AlignmentContext<S::Sink>>> = scratch
                .wave_mut(wave, lane)
                .par_chunks_mut(lane)
                .enumerate()
                .map(|(k, cells)| score_item(stream, wave_start + k, shared, cells, max_p, max_t, band))
                .collect();

            accepted.extend(
                results
                    .into_iter()
                    .enumerate()
                    .filter_map(|(k, ctx)| ctx.map(|c| (wave_start + k, c))),
            );
            wave_start += wave;
        }
    }

    stats.accepted = accepted.len();
    stats.dropped = scatter_outputs(stream, records, &accepted);
    stats
}

/// init_context + staging + DP for item `i`, inside one scratch lane.
fn score_item<S: ScoringStream>(
    stream: &S,
    i: usize,
    records: &[S::Record],
    cells: &mut [i32],
    max_p: u32,
    max_t: u32,
    band: Option<u32>,
) -> Option<AlignmentContext<S::Sink>> {
    let mut ctx = AlignmentContext::<S::Sink>::default();
    if !stream.init_context(i, records, &mut ctx) {
        return None;
    }

    let read = stream.pattern(&ctx);
    let window = stream.text(&ctx);
    let p_len = read.len().min(max_p as usize);
    let t_len = window.len().min(max_t as usize);
    if p_len < read.len() || t_len < window.len() {
        log::warn!(
            "Item {} exceeds stream bounds (pattern {}/{}, text {}/{}); truncating",
            i,
            read.len(),
            max_p,
            window.len(),
            max_t
        );
    }

    let bufs = LaneBuffers::split(cells, max_p, max_t);
    let read = &read[..p_len];
    if ctx.read_rc {
        for (dst, &c) in bufs.pattern.iter_mut().zip(read.iter().rev()) {
            *dst = complement_code(c) as i32;
        }
    } else {
        for (dst, &c) in bufs.pattern.iter_mut().zip(read) {
            *dst = c as i32;
        }
    }
    for (dst, &c) in bufs.text.iter_mut().zip(&window[..t_len]) {
        *dst = c as i32;
    }

    ctx.sink.set_min_score(ctx.min_score);
    score_window::<S::Aligner, S::Sink>(
        stream.scheme(),
        &bufs.pattern[..p_len],
        &bufs.text[..t_len],
        band,
        &mut bufs.h[..p_len + 1],
        &mut bufs.e[..p_len + 1],
        &mut ctx.sink,
    );
    Some(ctx)
}

/// Hand every accepted context to `output` with its own record.
///
/// Returns the number of contexts discarded because their record index was
/// out of range or already claimed by an earlier item.
fn scatter_outputs<S: ScoringStream>(
    stream: &S,
    records: &mut [S::Record],
    accepted: &[(usize, AlignmentContext<S::Sink>)],
) -> usize {
    let mut owner: Vec<Option<usize>> = vec![None; records.len()];
    let mut dropped = 0;

    for (k, (i, ctx)) in accepted.iter().enumerate() {
        match owner.get_mut(ctx.idx as usize) {
            Some(slot) => {
                if let Some(prev) = *slot {
                    log::error!(
                        "Items {} and {} both write record {}; dropping item {}",
                        accepted[prev].0,
                        i,
                        ctx.idx,
                        i
                    );
                    dropped += 1;
                } else {
                    *slot = Some(k);
                }
            }
            None => {
                log::error!(
                    "Item {} writes record {} outside an arena of {}; dropping",
                    i,
                    ctx.idx,
                    records.len()
                );
                dropped += 1;
            }
        }
    }

    records
        .par_iter_mut()
        .zip(owner.par_iter())
        .for_each(|(record, slot)| {
            if let Some(k) = *slot {
                let (i, ctx) = &accepted[k];
                stream.output(*i, ctx, record);
            }
        });

    dropped
}
