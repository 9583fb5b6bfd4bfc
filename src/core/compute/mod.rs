//! Compute helpers shared by the scoring kernels.

pub mod encoding;
