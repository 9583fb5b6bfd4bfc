//! Core alignment components: scoring scheme, sinks, the scoring-stream
//! contract and the batched DP executor.
//!
//! Nothing here knows about hit queues or pairing; those live in
//! `pipelines::scoring` and plug in through `ScoringStream`.

pub mod executor;
pub mod kernel;
pub mod scoring;
pub mod sink;
pub mod stream;
pub mod workspace; // DP scratch arena and lane layout
