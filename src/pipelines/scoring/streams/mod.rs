//! The four scoring streams of a round.
//!
//! | stream              | read scored     | threshold                      | DP     |
//! |---------------------|-----------------|--------------------------------|--------|
//! | `BestScoreStream`   | the read        | second best / score floor      | banded |
//! | `AnchorScoreStream` | anchor mate     | pair policy, other mate ideal  | banded |
//! | `OppositeScoreStream` | opposite mate | pair policy, anchor achieved   | full   |
//! | `AllScoreStream`    | the read        | per-length worst score         | banded |

pub mod all;
pub mod anchor;
pub mod best;
pub mod opposite;

pub use all::AllScoreStream;
pub use anchor::AnchorScoreStream;
pub use best::BestScoreStream;
pub use opposite::OppositeScoreStream;

/// Window of `read_len + band_len` bases starting `band_len / 2` before the
/// seed location, clamped to the genome.
#[inline]
pub(crate) fn centered_window(g_pos: u32, band_len: u32, read_len: u32, genome_len: u32) -> (u32, u32) {
    let begin = g_pos.saturating_sub(band_len / 2);
    let end = begin
        .saturating_add(band_len)
        .saturating_add(read_len)
        .min(genome_len);
    (begin, end)
}
