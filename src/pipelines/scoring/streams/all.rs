// Exhaustive ("all") stream
//
// Same window as the single-end stream, but with the fixed per-length
// worst-allowed score as threshold. Every alignment meeting it is appended
// to the round's alignment ring; hit records are left untouched.

use std::marker::PhantomData;

use super::centered_window;
use crate::core::alignment::scoring::{Aligner, ScoringScheme};
use crate::core::alignment::sink::BestSink;
use crate::core::alignment::stream::{AlignmentContext, ScoringStream};
use crate::pipelines::scoring::ring_buffer::{AlignmentRing, RoundCounter};
use crate::pipelines::scoring::state::{Alignment, HitRecord, PipelineState};

pub struct AllScoreStream<'a, A: Aligner> {
    state: PipelineState<'a>,
    band_len: u32,
    ring: &'a AlignmentRing,
    offset: u32,
    counter: &'a RoundCounter,
    _aligner: PhantomData<A>,
}

impl<'a, A: Aligner> AllScoreStream<'a, A> {
    pub fn new(
        state: PipelineState<'a>,
        band_len: u32,
        ring: &'a AlignmentRing,
        offset: u32,
        counter: &'a RoundCounter,
    ) -> Self {
        Self {
            state,
            band_len,
            ring,
            offset,
            counter,
            _aligner: PhantomData,
        }
    }
}

impl<A: Aligner> ScoringStream for AllScoreStream<'_, A> {
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

        let read_len = ctx.read_len();
        let (begin, end) = centered_window(hit.loc, self.band_len, read_len, self.state.genome_length());
        ctx.genome_begin = begin;
        ctx.genome_end = end;
        ctx.min_score = self.state.scheme.min_score(read_len);
        begin < end
    }

    fn output(&self, i: usize, ctx: &AlignmentContext<BestSink>, record: &mut HitRecord) {
        let score = ctx.sink.score;
        if score < ctx.min_score {
            return;
        }
        let slot = self.ring.push(
            self.counter,
            self.offset,
            record.read_id,
            Alignment::new(record.loc, 0, score, record.rc),
        );
        log::trace!(
            "score: {} (rc[{}], pos[{}], slot[{}], [qid {}])",
            score,
            ctx.read_rc as u8,
            ctx.genome_begin,
            slot,
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
