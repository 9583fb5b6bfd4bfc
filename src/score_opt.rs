// src/score_opt.rs
//
// Scoring options: the cost model, band, pairing constraints and buffer
// sizes of a scoring run, plus the command-line mirror that builds them.

use clap::Args;
use std::path::PathBuf;

use crate::core::alignment::scoring::{AlignmentMode, ScoreFunction, ScoringScheme, WORST_SCORE};
use crate::defaults;
use crate::pipelines::scoring::pairing::{PairingParams, PairingPolicy, ThresholdOptions};

/// What a round produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundMode {
    /// Best score per hit, written back to the hit records
    #[default]
    Best,
    /// Every alignment above the worst-allowed score, collected in a ring
    All,
}

impl RoundMode {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "best" => Ok(RoundMode::Best),
            "all" => Ok(RoundMode::All),
            _ => Err(format!("Round mode must be 'best' or 'all': {}", s)),
        }
    }
}

/// Scoring options
#[derive(Debug, Clone)]
pub struct ScoreOpt {
    // Scoring parameters
    pub mode: AlignmentMode,
    pub match_bonus: i32,      // Match bonus (0 in end-to-end mode)
    pub mismatch_penalty: i32, // Mismatch penalty
    pub n_penalty: i32,        // Penalty for positions with an N
    pub read_gap: (i32, i32),  // Read gap (open, extend)
    pub ref_gap: (i32, i32),   // Reference gap (open, extend)
    pub score_min: ScoreFunction,
    pub score_limit: i32, // Global score floor (WORST_SCORE = none)

    // Alignment parameters
    pub band_len: u32,
    pub round_mode: RoundMode,

    // Paired-end parameters
    pub min_frag_len: u32,
    pub max_frag_len: u32,
    pub policy: PairingPolicy,
    pub overlap: bool,
    pub anchor: u32,
    pub clamp_to_worst: bool, // Clamp mate thresholds to the per-mate worst score
    pub report_second: bool,  // Report the opposite mate's second-best end point

    // Buffers
    pub dp_scratch_cells: usize,
    pub ring_capacity: usize,

    // Processing parameters
    pub n_threads: Option<usize>,
    pub verbosity: u8,
}

impl Default for ScoreOpt {
    fn default() -> Self {
        ScoreOpt {
            mode: AlignmentMode::EndToEnd,
            match_bonus: defaults::MATCH_BONUS_END_TO_END,
            mismatch_penalty: defaults::MISMATCH_PENALTY,
            n_penalty: defaults::N_PENALTY,
            read_gap: (5, 3),
            ref_gap: (5, 3),
            score_min: ScoreFunction::linear(-0.6, -0.6),
            score_limit: WORST_SCORE,

            band_len: defaults::BAND_LEN,
            round_mode: RoundMode::Best,

            min_frag_len: defaults::MIN_FRAG_LEN,
            max_frag_len: defaults::MAX_FRAG_LEN,
            policy: PairingPolicy::FR,
            overlap: true,
            anchor: defaults::ANCHOR_MATE,
            clamp_to_worst: true,
            report_second: false,

            dp_scratch_cells: defaults::DP_SCRATCH_CELLS,
            ring_capacity: defaults::RING_CAPACITY,

            n_threads: None,
            verbosity: defaults::VERBOSITY,
        }
    }
}

impl ScoreOpt {
    /// Defaults for local mode: match bonus 2 and `G,20,8`
    pub fn local() -> Self {
        ScoreOpt {
            mode: AlignmentMode::Local,
            match_bonus: defaults::MATCH_BONUS_LOCAL,
            score_min: ScoreFunction::log(20.0, 8.0),
            ..Default::default()
        }
    }

    // ========================================================================
    // STAGE-SPECIFIC PARAMETER ACCESSORS
    // ========================================================================

    /// Scoring scheme shared by every stream of a round
    pub fn scheme(&self) -> ScoringScheme {
        ScoringScheme::new(
            self.mode,
            self.match_bonus,
            self.mismatch_penalty,
            self.n_penalty,
            self.read_gap,
            self.ref_gap,
            self.score_min,
        )
    }

    pub fn pairing_params(&self) -> PairingParams {
        PairingParams {
            min_frag_len: self.min_frag_len,
            max_frag_len: self.max_frag_len,
            policy: self.policy,
            overlap: self.overlap,
            anchor: self.anchor,
        }
    }

    pub fn threshold_options(&self) -> ThresholdOptions {
        ThresholdOptions {
            clamp_to_worst: self.clamp_to_worst,
            report_second: self.report_second,
        }
    }

    /// Validate parameters for consistency
    /// Returns Ok(()) if valid, or Err listing every issue
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        // Scoring validation
        if self.match_bonus < 0 {
            errors.push(format!("match_bonus must be >= 0, got {}", self.match_bonus));
        }
        if self.mode == AlignmentMode::Local && self.match_bonus == 0 {
            errors.push("match_bonus must be > 0 in local mode".to_string());
        }
        if self.mismatch_penalty < 0 {
            errors.push(format!(
                "mismatch_penalty must be >= 0, got {}",
                self.mismatch_penalty
            ));
        }
        if self.n_penalty < 0 {
            errors.push(format!("n_penalty must be >= 0, got {}", self.n_penalty));
        }
        for (name, (open, ext)) in [("read_gap", self.read_gap), ("ref_gap", self.ref_gap)] {
            if open < 0 || ext < 1 {
                errors.push(format!(
                    "{} must have open >= 0 and extend >= 1, got {},{}",
                    name, open, ext
                ));
            }
        }

        // Paired-end validation
        if self.min_frag_len > self.max_frag_len {
            errors.push(format!(
                "min_frag_len ({}) must not exceed max_frag_len ({})",
                self.min_frag_len, self.max_frag_len
            ));
        }
        if self.max_frag_len == 0 {
            errors.push("max_frag_len must be >= 1".to_string());
        }
        if self.anchor > 1 {
            errors.push(format!("anchor must be 0 or 1, got {}", self.anchor));
        }

        // Buffer validation
        if self.dp_scratch_cells == 0 {
            errors.push("dp_scratch_cells must be >= 1".to_string());
        }
        if self.round_mode == RoundMode::All && self.ring_capacity == 0 {
            errors.push("ring_capacity must be >= 1 in 'all' mode".to_string());
        }
        if self.n_threads == Some(0) {
            errors.push("threads must be >= 1".to_string());
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Parse gap penalties from "OPEN,EXTEND" (e.g., "5,3")
    pub fn parse_gap_penalties(s: &str) -> Result<(i32, i32), String> {
        let parts: Vec<&str> = s.split(',').collect();
        if parts.len() != 2 {
            return Err(format!("Gap penalty must be INT,INT: {}", s));
        }
        let open = parts[0]
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("Invalid gap open penalty: {}", parts[0]))?;
        let ext = parts[1]
            .trim()
            .parse::<i32>()
            .map_err(|_| format!("Invalid gap extension penalty: {}", parts[1]))?;
        Ok((open, ext))
    }
}

/// Command-line options of the `score` subcommand
#[derive(Debug, Clone, Args)]
pub struct ScoreCliOptions {
    /// Reference FASTA (.fa, .fa.gz)
    #[arg(value_name = "REF.FA")]
    pub reference: PathBuf,

    /// Seed-hit table: read index, strand, contig, position (tab separated)
    #[arg(value_name = "HITS.TSV")]
    pub hits: PathBuf,

    /// Input FASTQ file(s) - single file for single-end, two files for paired-end
    #[arg(value_name = "READS.FQ", required = true, num_args = 1..=2)]
    pub reads: Vec<PathBuf>,

    // ===== Round Options =====
    /// Round mode: best score per hit, or every alignment (single-end only)
    #[arg(long, value_name = "best|all", default_value = "best")]
    pub mode: String,

    /// Local alignment (default: end-to-end)
    #[arg(long)]
    pub local: bool,

    /// Band length of the banded DP (bucketed to 3, 7, 15 or 31)
    #[arg(short = 'b', long, value_name = "INT", default_value_t = defaults::BAND_LEN)]
    pub band: u32,

    // ===== Scoring Options =====
    /// Match bonus [0 end-to-end, 2 local]
    #[arg(long = "ma", value_name = "INT")]
    pub match_bonus: Option<i32>,

    /// Mismatch penalty
    #[arg(long = "mp", value_name = "INT", default_value_t = defaults::MISMATCH_PENALTY)]
    pub mismatch_penalty: i32,

    /// Penalty for positions where the read or reference has an N
    #[arg(long = "np", value_name = "INT", default_value_t = defaults::N_PENALTY)]
    pub n_penalty: i32,

    /// Read gap open and extend penalties
    #[arg(long = "rdg", value_name = "INT,INT", default_value = defaults::READ_GAP_PENALTIES)]
    pub read_gap: String,

    /// Reference gap open and extend penalties
    #[arg(long = "rfg", value_name = "INT,INT", default_value = defaults::REF_GAP_PENALTIES)]
    pub ref_gap: String,

    /// Minimum score function [L,-0.6,-0.6 end-to-end, G,20,8 local]
    #[arg(long = "score-min", value_name = "FUNC")]
    pub score_min: Option<String>,

    /// Global score floor applied on top of every threshold
    #[arg(long = "score-limit", value_name = "INT", allow_negative_numbers = true)]
    pub score_limit: Option<i32>,

    // ===== Paired-End Options =====
    /// Minimum fragment length
    #[arg(short = 'I', long = "minins", value_name = "INT", default_value_t = defaults::MIN_FRAG_LEN)]
    pub min_frag_len: u32,

    /// Maximum fragment length
    #[arg(short = 'X', long = "maxins", value_name = "INT", default_value_t = defaults::MAX_FRAG_LEN)]
    pub max_frag_len: u32,

    /// Mate orientation: ff, fr, rf or rr
    #[arg(long, value_name = "POLICY", default_value = defaults::PAIRING_POLICY)]
    pub policy: String,

    /// Do not let the mates overlap
    #[arg(long = "no-overlap")]
    pub no_overlap: bool,

    /// Mate scored first (0 or 1)
    #[arg(long, value_name = "INT", default_value_t = defaults::ANCHOR_MATE)]
    pub anchor: u32,

    /// Do not clamp mate thresholds to the per-mate minimum score
    #[arg(long = "no-mate-clamp")]
    pub no_mate_clamp: bool,

    /// Report the opposite mate's second-best end point
    #[arg(long = "report-second")]
    pub report_second: bool,

    // ===== Buffer Options =====
    /// DP scratch capacity in cells
    #[arg(long = "dp-cells", value_name = "INT", default_value_t = defaults::DP_SCRATCH_CELLS)]
    pub dp_cells: usize,

    /// Alignment ring capacity for --mode all
    #[arg(long = "ring-size", value_name = "INT", default_value_t = defaults::RING_CAPACITY)]
    pub ring_size: usize,

    // ===== I/O Options =====
    /// Output file (default: stdout)
    #[arg(short = 'o', long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Number of threads (default: all cores)
    #[arg(short = 't', long, value_name = "INT")]
    pub threads: Option<usize>,

    /// Verbosity level (1=error, 2=warning, 3=info, 4+=debug)
    #[arg(short = 'v', long, value_name = "INT", default_value_t = defaults::VERBOSITY)]
    pub verbosity: u8,
}

impl ScoreCliOptions {
    /// Build scoring options from the command line
    pub fn into_opt(&self) -> Result<ScoreOpt, String> {
        let mut opt = if self.local {
            ScoreOpt::local()
        } else {
            ScoreOpt::default()
        };

        opt.round_mode = RoundMode::parse(&self.mode)?;
        opt.band_len = self.band;
        if let Some(ma) = self.match_bonus {
            opt.match_bonus = ma;
        }
        opt.mismatch_penalty = self.mismatch_penalty;
        opt.n_penalty = self.n_penalty;
        opt.read_gap = ScoreOpt::parse_gap_penalties(&self.read_gap)?;
        opt.ref_gap = ScoreOpt::parse_gap_penalties(&self.ref_gap)?;
        if let Some(f) = &self.score_min {
            opt.score_min = ScoreFunction::parse(f)?;
        }
        if let Some(limit) = self.score_limit {
            opt.score_limit = limit;
        }

        opt.min_frag_len = self.min_frag_len;
        opt.max_frag_len = self.max_frag_len;
        opt.policy = PairingPolicy::parse(&self.policy)?;
        opt.overlap = !self.no_overlap;
        opt.anchor = self.anchor;
        opt.clamp_to_worst = !self.no_mate_clamp;
        opt.report_second = self.report_second;

        opt.dp_scratch_cells = self.dp_cells;
        opt.ring_capacity = self.ring_size;
        opt.n_threads = self.threads;
        opt.verbosity = self.verbosity;
        Ok(opt)
    }
}
