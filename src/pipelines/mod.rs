//! Scoring pipelines.
//!
//! - `scoring`: batched best/anchor/opposite/all scoring rounds over a queue
//!   of seed hits

pub mod scoring;
