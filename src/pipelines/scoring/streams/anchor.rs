// Paired-end anchor-mate stream
//
// First pass of a paired round. The anchor mate is scored in the same
// centred window as the single-end stream, against a threshold from the
// pair policy that assumes the opposite mate will align perfectly. Hits at a
// (mate, strand, location) already recorded in the best tables are skipped,
// as are hits whose threshold exceeds the anchor's perfect score.

use std::marker::PhantomData;

use super::centered_window;
use crate::core::alignment::scoring::{Aligner, ScoringScheme, WORST_SCORE};
use crate::core::alignment::sink::BestSink;
use crate::core::alignment::stream::{AlignmentContext, ScoringStream};
use crate::pipelines::scoring::pairing::{MateBounds, anchor_threshold};
use crate::pipelines::scoring::state::{HitRecord, PairedState};

pub struct AnchorScoreStream<'a, A: Aligner> {
    state: PairedState<'a>,
    band_len: u32,
    _aligner: PhantomData<A>,
}

impl<'a, A: Aligner> AnchorScoreStream<'a, A> {
    pub fn new(state: PairedState<'a>, band_len: u32) -> Self {
        Self {
            state,
            band_len,
            _aligner: PhantomData,
        }
    }
}

impl<A: Aligner> ScoringStream for AnchorScoreStream<'_, A> {
    type Aligner = A;
    type Sink = BestSink;
    type Record = HitRecord;

    fn scheme(&self) -> &ScoringScheme {
        self.state.base.scheme
    }

    fn size(&self) -> usize {
        self.state.base.idx_queue.len()
    }

    fn max_pattern_length(&self) -> u32 {
        self.state.base.reads.max_read_len()
    }

    fn max_text_length(&self) -> u32 {
        self.state.base.reads.max_read_len() + self.band_len
    }

    fn init_context(&self, i: usize, records: &[HitRecord], ctx: &mut AlignmentContext<BestSink>) -> bool {
        let base = &self.state.base;
        let idx = base.idx_queue[i];
        let Some(hit) = records.get(idx as usize) else {
            return false;
        };
        let read_id = hit.read_id;
        let g_pos = hit.loc;
        let scheme = base.scheme;

        let best = self.state.best_paired(read_id);

        let a_range = base.reads.get_range(read_id);
        let a_len = a_range.len();
        let anchor = MateBounds {
            worst: scheme.min_score(a_len),
            optimal: scheme.perfect_score(a_len),
        };
        let o_len = self.state.reads_o.read_len(read_id);
        let opposite = MateBounds {
            worst: scheme.min_score(o_len),
            optimal: scheme.perfect_score(o_len),
        };

        let threshold = anchor_threshold(&best, anchor, opposite, base.score_limit, self.state.options);

        ctx.idx = idx;
        ctx.mate = 0;
        ctx.read_rc = hit.rc;
        ctx.read_id = read_id;
        ctx.read_range = a_range;

        let (begin, end) = centered_window(g_pos, self.band_len, a_len, base.genome_length());
        ctx.genome_begin = begin;
        ctx.genome_end = end;
        ctx.min_score = threshold.min_score;

        let visited = best.has_visited(self.state.pairing.anchor, hit.rc, g_pos);
        if visited || !threshold.reachable || begin >= end {
            log::trace!(
                "score anchor: skip (visited[{}], min[{}], opt[{}], rc[{}], pos[{}], [qid {}])",
                visited as u8,
                threshold.min_score,
                anchor.optimal,
                hit.rc as u8,
                g_pos,
                i
            );
            return false;
        }
        true
    }

    fn output(&self, i: usize, ctx: &AlignmentContext<BestSink>, record: &mut HitRecord) {
        let sink = &ctx.sink;
        record.score = if sink.score >= ctx.min_score {
            sink.score
        } else {
            WORST_SCORE
        };
        record.sink = ctx.genome_begin + sink.text_offset();
        record.mate = self.state.pairing.anchor;

        log::trace!(
            "score anchor: {} (min[{}], mate[{}], rc[{}], pos[{}], [qid {}])",
            sink.score,
            ctx.min_score,
            self.state.pairing.anchor,
            ctx.read_rc as u8,
            ctx.genome_begin,
            i
        );
    }

    fn pattern(&self, ctx: &AlignmentContext<BestSink>) -> &[u8] {
        self.state.base.reads.sequence(ctx.read_range)
    }

    fn text(&self, ctx: &AlignmentContext<BestSink>) -> &[u8] {
        self.state.base.genome_window(ctx.genome_begin, ctx.genome_end)
    }
}
