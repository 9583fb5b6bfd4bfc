// Score-only affine-gap DP kernel
//
// Scores one oriented pattern against one text window and reports candidate
// end cells to a sink. The matrix is filled column by column over the text,
// keeping a single H/E column of pattern_len + 1 cells:
//
//   H(i,j) = max(H(i-1,j-1) + s(p_i,t_j), E(i,j), F(i,j))
//   E(i,j) = max(H(i,j-1) - (rd_open + rd_ext), E(i,j-1) - rd_ext)   read gap
//   F(i,j) = max(H(i-1,j) - (rf_open + rf_ext), F(i-1,j) - rf_ext)   ref gap
//
// Row 0 is free (the alignment may start at any text offset). End-to-end
// mode reports the last pattern row of every column; local mode clamps cells
// at zero and reports every positive cell.
//
// With a band of width W only cells with 0 <= j - i <= W are evaluated,
// i.e. the alignment must start within the first W + 1 text positions and
// may drift at most W diagonals.

use super::scoring::{Aligner, ScoringScheme};
use super::sink::{AlignmentSink, SinkPos};

/// Out-of-band / unreachable cell value. Far enough from i32::MIN that
/// subtracting gap penalties over a full window cannot wrap.
const NEG_INF: i32 = i32::MIN / 4;

/// Fill the DP matrix for `pattern` x `text`, reporting end cells to `sink`.
///
/// `h` and `e` must hold at least `pattern.len() + 1` cells; their contents
/// on entry are ignored. Text columns beyond the band contribute nothing.
#[allow(clippy::too_many_arguments)]
pub fn score_window<A: Aligner, K: AlignmentSink>(
    scheme: &ScoringScheme,
    pattern: &[i32],
    text: &[i32],
    band: Option<u32>,
    h: &mut [i32],
    e: &mut [i32],
    sink: &mut K,
) {
    let p_len = pattern.len();
    let t_len = text.len();
    if p_len == 0 || t_len == 0 {
        return;
    }

    let (rd_open, rd_ext) = scheme.read_gap();
    let (rf_open, rf_ext) = scheme.ref_gap();
    let rd_oe = rd_open + rd_ext;
    let rf_oe = rf_open + rf_ext;

    // Column 0: no text consumed yet
    h[0] = 0;
    e[0] = NEG_INF;
    for i in 1..=p_len {
        h[i] = match band {
            Some(_) => NEG_INF,
            None if A::LOCAL => 0,
            None => -(rf_open + rf_ext * i as i32),
        };
        e[i] = NEG_INF;
    }

    for j in 1..=t_len {
        let t = text[j - 1] as u8;
        let (lo, hi) = match band {
            Some(w) => {
                let w = w as usize;
                let lo = if j > w { j - w } else { 1 };
                (lo, j.min(p_len))
            }
            None => (1, p_len),
        };
        // band has slid past the last pattern row
        if lo > hi {
            continue;
        }

        // H(lo-1, j-1), read before row 0 is overwritten
        let mut diag = h[lo - 1];
        let row0_in_band = band.is_none_or(|w| j <= w as usize);
        if lo == 1 {
            h[0] = if row0_in_band { 0 } else { NEG_INF };
        }
        let mut h_up = if lo == 1 { h[0] } else { NEG_INF };
        let mut f = NEG_INF;

        for i in lo..=hi {
            let m = diag + scheme.substitution(pattern[i - 1] as u8, t);
            let e_i = (h[i] - rd_oe).max(e[i] - rd_ext);
            f = (h_up - rf_oe).max(f - rf_ext);

            let mut cell = m.max(e_i).max(f);
            if A::LOCAL {
                cell = cell.max(0);
            }

            diag = h[i];
            h[i] = cell;
            e[i] = e_i;
            h_up = cell;

            if A::LOCAL && cell > 0 {
                sink.report(
                    cell,
                    SinkPos {
                        text: (j - 1) as u32,
                        pattern: (i - 1) as u32,
                    },
                );
            }
        }

        if !A::LOCAL && hi == p_len && h[p_len] > NEG_INF / 2 {
            sink.report(
                h[p_len],
                SinkPos {
                    text: (j - 1) as u32,
                    pattern: (p_len - 1) as u32,
                },
            );
        }
    }
}
