// Scoring scheme module
//
// This module holds the cost model consumed by the scoring streams and the
// DP kernel:
// - Substitution matrix (5x5 for A,C,G,T,N) built from match/mismatch/N costs
// - Affine read-gap and reference-gap penalties
// - Perfect score and worst allowed score as functions of read length
// - Local vs end-to-end aligner selection
//
// Penalties are stored as positive numbers and subtracted by the kernel.

use std::fmt;

/// Sentinel score meaning "no valid alignment".
///
/// Threshold arithmetic against this value must saturate.
pub const WORST_SCORE: i32 = i32::MIN;

/// Alignment mode of a scoring round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlignmentMode {
    /// The whole read must align; text ends are free.
    #[default]
    EndToEnd,
    /// Any substring of the read may align; scores are clamped at zero.
    Local,
}

impl AlignmentMode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "end-to-end" | "e2e" | "global" => Ok(AlignmentMode::EndToEnd),
            "local" => Ok(AlignmentMode::Local),
            _ => Err(format!("Alignment mode must be 'end-to-end' or 'local': {}", s)),
        }
    }
}

impl fmt::Display for AlignmentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AlignmentMode::EndToEnd => write!(f, "end-to-end"),
            AlignmentMode::Local => write!(f, "local"),
        }
    }
}

/// Compile-time aligner selector.
///
/// Streams and kernels are generic over this trait so that each mode gets
/// its own monomorphised hot loop.
pub trait Aligner: Copy + Default + Send + Sync + fmt::Debug + 'static {
    /// Clamp cell scores at zero and report every cell to the sink
    const LOCAL: bool;

    fn mode() -> AlignmentMode {
        if Self::LOCAL {
            AlignmentMode::Local
        } else {
            AlignmentMode::EndToEnd
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct EndToEndAligner;

impl Aligner for EndToEndAligner {
    const LOCAL: bool = false;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LocalAligner;

impl Aligner for LocalAligner {
    const LOCAL: bool = true;
}

/// Shape of a length-dependent score function.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreFunctionKind {
    Constant,
    Linear,
    Sqrt,
    Log,
}

/// Length-dependent score function `constant + coefficient * f(len)`.
///
/// Parsed from the `C,a` / `L,a,b` / `S,a,b` / `G,a,b` notation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreFunction {
    pub kind: ScoreFunctionKind,
    pub constant: f64,
    pub coefficient: f64,
}

impl ScoreFunction {
    pub fn linear(constant: f64, coefficient: f64) -> Self {
        Self {
            kind: ScoreFunctionKind::Linear,
            constant,
            coefficient,
        }
    }

    pub fn log(constant: f64, coefficient: f64) -> Self {
        Self {
            kind: ScoreFunctionKind::Log,
            constant,
            coefficient,
        }
    }

    /// Evaluate the function for a sequence length.
    pub fn eval(&self, len: u32) -> f64 {
        let x = len as f64;
        let f = match self.kind {
            ScoreFunctionKind::Constant => 0.0,
            ScoreFunctionKind::Linear => x,
            ScoreFunctionKind::Sqrt => x.sqrt(),
            ScoreFunctionKind::Log => {
                if len == 0 {
                    0.0
                } else {
                    x.ln()
                }
            }
        };
        self.constant + self.coefficient * f
    }

    /// Parse a score function from "KIND,CONSTANT[,COEFFICIENT]"
    /// Example: "L,-0.6,-0.6" or "G,20,8" or "C,30"
    pub fn parse(s: &str) -> Result<Self, String> {
        let parts: Vec<&str> = s.split(',').map(|p| p.trim()).collect();
        if parts.len() < 2 || parts.len() > 3 {
            return Err(format!("Score function must be KIND,FLOAT[,FLOAT]: {}", s));
        }

        let kind = match parts[0] {
            "C" => ScoreFunctionKind::Constant,
            "L" => ScoreFunctionKind::Linear,
            "S" => ScoreFunctionKind::Sqrt,
            "G" => ScoreFunctionKind::Log,
            other => return Err(format!("Unknown score function kind '{}' in {}", other, s)),
        };

        let constant = parts[1]
            .parse::<f64>()
            .map_err(|_| format!("Invalid score function constant: {}", parts[1]))?;

        let coefficient = if parts.len() == 3 {
            parts[2]
                .parse::<f64>()
                .map_err(|_| format!("Invalid score function coefficient: {}", parts[2]))?
        } else if kind == ScoreFunctionKind::Constant {
            0.0
        } else {
            return Err(format!("Score function {} needs a coefficient: {}", parts[0], s));
        };

        Ok(Self {
            kind,
            constant,
            coefficient,
        })
    }
}

/// Fill a 5x5 substitution matrix (A,C,G,T,N) from match/mismatch/N costs.
pub fn fill_substitution_matrix(match_bonus: i32, mismatch_penalty: i32, n_penalty: i32) -> [i32; 25] {
    let mut mat = [0i32; 25];
    for i in 0..5 {
        for j in 0..5 {
            mat[i * 5 + j] = if i == 4 || j == 4 {
                -n_penalty
            } else if i == j {
                match_bonus
            } else {
                -mismatch_penalty
            };
        }
    }
    mat
}

/// Scoring scheme shared by all streams of a round.
#[derive(Debug, Clone)]
pub struct ScoringScheme {
    mode: AlignmentMode,
    match_bonus: i32,
    mismatch_penalty: i32,
    n_penalty: i32,
    read_gap_open: i32,
    read_gap_extend: i32,
    ref_gap_open: i32,
    ref_gap_extend: i32,
    score_min: ScoreFunction,
    mat: [i32; 25],
}

impl ScoringScheme {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        mode: AlignmentMode,
        match_bonus: i32,
        mismatch_penalty: i32,
        n_penalty: i32,
        read_gap: (i32, i32),
        ref_gap: (i32, i32),
        score_min: ScoreFunction,
    ) -> Self {
        ScoringScheme {
            mode,
            match_bonus,
            mismatch_penalty,
            n_penalty,
            read_gap_open: read_gap.0,
            read_gap_extend: read_gap.1,
            ref_gap_open: ref_gap.0,
            ref_gap_extend: ref_gap.1,
            score_min,
            mat: fill_substitution_matrix(match_bonus, mismatch_penalty, n_penalty),
        }
    }

    /// Bowtie2 end-to-end defaults: no match bonus, `L,-0.6,-0.6`
    pub fn end_to_end() -> Self {
        Self::new(
            AlignmentMode::EndToEnd,
            0,
            6,
            1,
            (5, 3),
            (5, 3),
            ScoreFunction::linear(-0.6, -0.6),
        )
    }

    /// Bowtie2 local defaults: match bonus 2, `G,20,8`
    pub fn local() -> Self {
        Self::new(
            AlignmentMode::Local,
            2,
            6,
            1,
            (5, 3),
            (5, 3),
            ScoreFunction::log(20.0, 8.0),
        )
    }

    pub fn mode(&self) -> AlignmentMode {
        self.mode
    }

    pub fn match_bonus(&self) -> i32 {
        self.match_bonus
    }

    pub fn mismatch_penalty(&self) -> i32 {
        self.mismatch_penalty
    }

    pub fn n_penalty(&self) -> i32 {
        self.n_penalty
    }

    /// Returns (open, extend) for gaps in the read (text consumed)
    pub fn read_gap(&self) -> (i32, i32) {
        (self.read_gap_open, self.read_gap_extend)
    }

    /// Returns (open, extend) for gaps in the reference (pattern consumed)
    pub fn ref_gap(&self) -> (i32, i32) {
        (self.ref_gap_open, self.ref_gap_extend)
    }

    pub fn score_min(&self) -> &ScoreFunction {
        &self.score_min
    }

    /// Score of aligning pattern code `p` against text code `t`
    #[inline(always)]
    pub fn substitution(&self, p: u8, t: u8) -> i32 {
        let p = (p as usize).min(4);
        let t = (t as usize).min(4);
        self.mat[p * 5 + t]
    }

    /// Maximum score reachable by a read of length `len`
    #[inline]
    pub fn perfect_score(&self, len: u32) -> i32 {
        self.match_bonus.saturating_mul(len as i32)
    }

    /// Worst score still considered a valid alignment for length `len`
    #[inline]
    pub fn min_score(&self, len: u32) -> i32 {
        let v = self.score_min.eval(len);
        // truncation toward zero, saturating at the i32 range
        v as i32
    }

    /// Largest number of reference gaps whose cost still fits between the
    /// perfect score of `len` and `min_score`.
    pub fn max_reference_gaps(&self, min_score: i32, len: u32) -> u32 {
        let budget = self.perfect_score(len) as i64 - min_score as i64;
        let first = (self.ref_gap_open + self.ref_gap_extend) as i64;
        if budget < first || self.ref_gap_extend <= 0 {
            return 0;
        }
        (1 + (budget - first) / self.ref_gap_extend as i64).min(u32::MAX as i64) as u32
    }
}

impl Default for ScoringScheme {
    fn default() -> Self {
        Self::end_to_end()
    }
}
