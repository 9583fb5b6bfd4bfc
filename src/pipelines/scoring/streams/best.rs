// Single-end best-score stream
//
// Scores each queued hit's read against a window centred on the seed
// location. The threshold is the read's second-best recorded score (or the
// global floor), so only alignments that would change the best/second-best
// pair matter downstream.

use std::marker::PhantomData;

use super::centered_window;
use crate::core::alignment::scoring::{Aligner, ScoringScheme};
use crate::core::alignment::sink::BestSink;
use crate::core::alignment::stream::{AlignmentContext, ScoringStream};
use crate::pipelines::scoring::state::{HitRecord, PipelineState};

pub struct BestScoreStream<'a, A: Aligner> {
    state: PipelineState<'a>,
    band_len: u32,
    _aligner: PhantomData<A>,
}

impl<'a, A: Aligner> BestScoreStream<'a, A> {
    /// `band_len` must be the band the executor is specialised for
    pub fn new(state: PipelineState<'a>, band_len: u32) -> Self {
        Self {
            state,
            band_len,
            _aligner: PhantomData,
        }
    }
}

impl<A: Aligner> ScoringStream for BestScoreStream<'_, A> {
    type Aligner = A;
    type Sink = BestSink;
    type Record = HitRecord;

    fn scheme(&self) -> &ScoringScheme {
        self.state.scheme
    }

    fn size(&self) -> usize {
        self.state.idx_queue.len()
    }

    fn max_pattern_length(&self) -> u32 {
        self.state.reads.max_read_len()
    }

    fn max_text_length(&self) -> u32 {
        self.state.reads.max_read_len() + self.band_len
    }

    fn init_context(&self, i: usize, records: &[HitRecord], ctx: &mut AlignmentContext<BestSink>) -> bool {
        let idx = self.state.idx_queue[i];
        let Some(hit) = records.get(idx as usize) else {
            return false;
        };

        ctx.idx = idx;
        ctx.mate = 0;
        ctx.read_rc = hit.rc;
        ctx.read_id = hit.read_id;
        ctx.read_range = self.state.reads.get_range(hit.read_id);

        let (begin, end) = centered_window(
            hit.loc,
            self.band_len,
            ctx.read_len(),
            self.state.genome_length(),
        );
        ctx.genome_begin = begin;
        ctx.genome_end = end;
        if begin >= end {
            log::trace!("Hit {} at {} lies outside the genome; skipping", idx, hit.loc);
            return false;
        }

        let second_best = self.state.best.second_best(hit.read_id);
        ctx.min_score = second_best.score.max(self.state.score_limit);

        log::trace!(
            "score-min: {} (rc[{}], pos[{}], [qid {}])",
            ctx.min_score,
            ctx.read_rc as u8,
            ctx.genome_begin,
            i
        );
        true
    }

    fn output(&self, i: usize, ctx: &AlignmentContext<BestSink>, record: &mut HitRecord) {
        // the sink starts at the sentinel, so its score is never below it
        record.score = ctx.sink.score;
        record.sink = ctx.genome_begin + ctx.sink.text_offset();

        log::trace!(
            "score: {} (rc[{}], pos[{}], [qid {}])",
            ctx.sink.score,
            ctx.read_rc as u8,
            ctx.genome_begin,
            i
        );
    }

    fn pattern(&self, ctx: &AlignmentContext<BestSink>) -> &[u8] {
        self.state.reads.sequence(ctx.read_range)
    }

    fn text(&self, ctx: &AlignmentContext<BestSink>) -> &[u8] {
        self.state.genome_window(ctx.genome_begin, ctx.genome_end)
    }
}
