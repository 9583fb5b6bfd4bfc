pub mod core;
pub mod defaults;
pub mod pipelines;
pub mod score;
pub mod score_opt;
