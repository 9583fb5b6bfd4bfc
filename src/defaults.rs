// src/defaults.rs

// Scoring Constants (Bowtie2 defaults)
pub const MATCH_BONUS_LOCAL: i32 = 2;
pub const MATCH_BONUS_END_TO_END: i32 = 0;
pub const MISMATCH_PENALTY: i32 = 6;
pub const N_PENALTY: i32 = 1;
pub const READ_GAP_PENALTIES: &str = "5,3";
pub const REF_GAP_PENALTIES: &str = "5,3";

// Banding Constants
pub const BAND_LEN: u32 = 15;

// Paired-end Constants
pub const MIN_FRAG_LEN: u32 = 0;
pub const MAX_FRAG_LEN: u32 = 500;
pub const PAIRING_POLICY: &str = "fr";
pub const ANCHOR_MATE: u32 = 0;

// Buffer Constants
/// DP scratch capacity in i32 cells (64 MiB)
pub const DP_SCRATCH_CELLS: usize = 16 * 1024 * 1024;
pub const RING_CAPACITY: usize = 1 << 20;
/// Number of distinct-column entries kept for second-best opposite sinks
pub const OPPOSITE_SINK_ENTRIES: usize = 20;

// Other Constants
pub const VERBOSITY: u8 = 3;
