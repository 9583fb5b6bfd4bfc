// Paired-end opposite-mate stream
//
// Second pass of a paired round, run over the hits whose anchor mate scored.
// The opposite mate is searched in a one-sided window implied by the pairing
// policy and the fragment-length bounds:
//
//   left of the anchor:  [anchor_end - max_frag, min(anchor_end | anchor_begin,
//                                                     anchor_end + gapped_len - min_frag))
//   right of the anchor: [max(anchor_begin | anchor_end,
//                             anchor_begin + min_frag - gapped_len), anchor_begin + max_frag)
//
// where the `|` alternatives are chosen by the overlap flag and
// `gapped_len` is the opposite read length plus the largest number of
// reference gaps still affordable at the threshold. The whole window is
// scored with the full DP; the best end cell (and optionally a second one
// at least half a read away) is kept.

use std::marker::PhantomData;

use crate::core::alignment::scoring::{Aligner, ScoringScheme, WORST_SCORE};
use crate::core::alignment::sink::{BestColumnSink, SinkPos};
use crate::core::alignment::stream::{AlignmentContext, ScoringStream};
use crate::defaults::OPPOSITE_SINK_ENTRIES;
use crate::pipelines::scoring::pairing::{MateBounds, PairingParams, frame_opposite_mate, opposite_threshold};
use crate::pipelines::scoring::state::{HitRecord, PairedState};

pub type OppositeSink = BestColumnSink<OPPOSITE_SINK_ENTRIES>;

pub struct OppositeScoreStream<'a, A: Aligner> {
    state: PairedState<'a>,
    /// Positions in the hit queue whose anchor scored
    opposite_queue: &'a [u32],
    _aligner: PhantomData<A>,
}

impl<'a, A: Aligner> OppositeScoreStream<'a, A> {
    pub fn new(state: PairedState<'a>, opposite_queue: &'a [u32]) -> Self {
        Self {
            state,
            opposite_queue,
            _aligner: PhantomData,
        }
    }
}

/// Opposite-mate window given the anchor placement and framing.
///
/// Returns `(begin, end)` before clamping to the genome.
pub fn opposite_window(pairing: &PairingParams, g_pos: u32, a_len: u32, o_gapped_len: u32, o_left: bool) -> (u32, u32) {
    let anchor_end = g_pos.saturating_add(a_len);
    if o_left {
        let max_end = anchor_end
            .saturating_add(o_gapped_len)
            .saturating_sub(pairing.min_frag_len);
        let begin = anchor_end.saturating_sub(pairing.max_frag_len);
        let end = if pairing.overlap { anchor_end } else { g_pos };
        (begin, end.min(max_end))
    } else {
        let min_begin = g_pos
            .saturating_add(pairing.min_frag_len)
            .saturating_sub(o_gapped_len);
        let end = g_pos.saturating_add(pairing.max_frag_len);
        let begin = if pairing.overlap { g_pos } else { anchor_end };
        (begin.max(min_begin), end)
    }
}

impl<A: Aligner> ScoringStream for OppositeScoreStream<'_, A> {
    type Aligner = A;
    type Sink = OppositeSink;
    type Record = HitRecord;

    fn scheme(&self) -> &ScoringScheme {
        self.state.base.scheme
    }

    fn size(&self) -> usize {
        self.opposite_queue.len()
    }

    fn max_pattern_length(&self) -> u32 {
        self.state.reads_o.max_read_len()
    }

    fn max_text_length(&self) -> u32 {
        self.state.pairing.max_frag_len
    }

    fn init_context(&self, i: usize, records: &[HitRecord], ctx: &mut AlignmentContext<OppositeSink>) -> bool {
        let base = &self.state.base;
        let pairing = &self.state.pairing;
        let Some(&idx) = base.idx_queue.get(self.opposite_queue[i] as usize) else {
            return false;
        };
        let Some(hit) = records.get(idx as usize) else {
            return false;
        };
        let read_id = hit.read_id;
        let g_pos = hit.loc;
        let scheme = base.scheme;

        let a_len = base.reads.read_len(read_id);
        let anchor = MateBounds {
            worst: scheme.min_score(a_len),
            optimal: scheme.perfect_score(a_len),
        };
        let o_range = self.state.reads_o.get_range(read_id);
        let o_len = o_range.len();
        let opposite = MateBounds {
            worst: scheme.min_score(o_len),
            optimal: scheme.perfect_score(o_len),
        };

        let best = self.state.best_paired(read_id);
        let threshold = opposite_threshold(
            &best,
            anchor,
            opposite,
            hit.score,
            base.score_limit,
            self.state.options,
        );
        ctx.idx = idx;
        ctx.min_score = threshold.min_score;

        if !threshold.reachable {
            log::trace!(
                "score opposite: min-score too high: {} > {} (mate[{}], rc[{}], [qid {}])",
                threshold.min_score,
                opposite.optimal,
                pairing.opposite_mate(),
                hit.rc as u8,
                i
            );
            return false;
        }

        let (o_left, o_fw) = frame_opposite_mate(pairing.policy, pairing.anchor, !hit.rc);

        ctx.mate = 1;
        ctx.read_rc = !o_fw;
        ctx.read_id = read_id;
        ctx.read_range = o_range;

        let o_gapped_len = o_len + scheme.max_reference_gaps(threshold.min_score, o_len);
        let (begin, end) = opposite_window(pairing, g_pos, a_len, o_gapped_len, o_left);

        let genome_len = base.genome_length();
        if begin >= genome_len {
            return false;
        }
        ctx.genome_begin = begin;
        ctx.genome_end = end.min(genome_len);

        if best.has_visited(pairing.opposite_mate(), ctx.read_rc, g_pos) || ctx.genome_begin >= ctx.genome_end {
            return false;
        }
        true
    }

    fn output(&self, i: usize, ctx: &AlignmentContext<OppositeSink>, record: &mut HitRecord) {
        let (best, second) = ctx.sink.best2(ctx.read_len() / 2);

        let keep = |entry: Option<(i32, SinkPos)>| match entry {
            Some((score, pos)) => {
                let score = if score >= ctx.min_score { score } else { WORST_SCORE };
                (score, ctx.genome_begin + pos.text)
            }
            None => (WORST_SCORE, ctx.genome_begin),
        };

        let (score, sink) = keep(best);
        record.opposite_loc = ctx.genome_begin;
        record.opposite_score = score;
        record.opposite_sink = sink;

        if self.state.options.report_second {
            let (score2, sink2) = keep(second);
            record.opposite_score2 = score2;
            record.opposite_sink2 = sink2;
        } else {
            record.opposite_score2 = WORST_SCORE;
            record.opposite_sink2 = ctx.genome_begin;
        }

        log::trace!(
            "score opposite: {} (min[{}], mate[{}], rc[{}], pos[{}:{}], [qid {}])",
            score,
            ctx.min_score,
            self.state.pairing.opposite_mate(),
            ctx.read_rc as u8,
            ctx.genome_begin,
            ctx.genome_end,
            i
        );
    }

    fn pattern(&self, ctx: &AlignmentContext<OppositeSink>) -> &[u8] {
        self.state.reads_o.sequence(ctx.read_range)
    }

    fn text(&self, ctx: &AlignmentContext<OppositeSink>) -> &[u8] {
        self.state.base.genome_window(ctx.genome_begin, ctx.genome_end)
    }
}
