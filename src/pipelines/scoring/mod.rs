//! Batched alignment scoring of seed hits.
//!
//! One scoring round takes a queue of seed-derived hits, frames a genome
//! window and a minimum score for each, has the batch executor align them,
//! and writes scores and end points back into the hit arena.
//!
//! - `state`: read sets, hit records, best-alignment tables, round views
//! - `pairing`: pair threshold policy and opposite-mate framing
//! - `streams`: the Best, Anchor, Opposite and All scoring streams
//! - `dispatch`: band bucket selection and aligner specialisation
//! - `ring_buffer`: alignment ring for exhaustive rounds
//! - `orchestrator`: single-end, paired and exhaustive round runners

pub mod dispatch;
pub mod orchestrator;
pub mod pairing;
pub mod ring_buffer;
pub mod state;
pub mod streams;

pub use dispatch::{BAND_BUCKETS, anchor_score_best, band_bucket, opposite_score_best, score_all, score_best};
pub use orchestrator::{PairedRoundSummary, RoundSummary, run_all_round, run_paired_round, run_single_end_round};
pub use pairing::{PairingParams, PairingPolicy, ThresholdOptions};
pub use ring_buffer::{AlignmentRing, RoundCounter};
pub use state::{
    Alignment, BestAlignmentTable, BestAlignments, BestPairedAlignments, HitRecord, PairedState, PipelineState,
    ReadSet,
};
