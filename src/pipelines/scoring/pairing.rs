// Pair-consistency score thresholds and opposite-mate framing
//
// Paired rounds score the anchor mate first and the opposite mate second.
// Both passes derive a per-mate minimum score from the best pair recorded so
// far, so that only candidates able to beat it are aligned:
//
//   target_pair = min(best_pair_floor + 1, optimal_self + optimal_other)
//   target_mate = target_pair - other_contribution
//   target_mate = max(target_mate, worst_self)        (optional clamp)
//   min_score   = max(target_mate, score_limit)
//
// `other_contribution` is the other mate's optimal score in the anchor pass
// and the anchor's achieved score in the opposite pass. A threshold above the
// mate's own optimal score cannot be met and the item is skipped.

use std::fmt;

use super::state::BestPairedAlignments;
use crate::defaults;

/// Relative orientation of the two mates of a fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PairingPolicy {
    FF,
    #[default]
    FR,
    RF,
    RR,
}

impl PairingPolicy {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "ff" => Ok(PairingPolicy::FF),
            "fr" => Ok(PairingPolicy::FR),
            "rf" => Ok(PairingPolicy::RF),
            "rr" => Ok(PairingPolicy::RR),
            _ => Err(format!("Pairing policy must be one of ff, fr, rf, rr: {}", s)),
        }
    }
}

impl fmt::Display for PairingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PairingPolicy::FF => "ff",
            PairingPolicy::FR => "fr",
            PairingPolicy::RF => "rf",
            PairingPolicy::RR => "rr",
        };
        write!(f, "{}", s)
    }
}

/// Fragment-length and orientation constraints of a paired round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairingParams {
    pub min_frag_len: u32,
    pub max_frag_len: u32,
    pub policy: PairingPolicy,
    /// Mates may overlap (or contain each other)
    pub overlap: bool,
    /// Which mate (0 or 1) is scored first
    pub anchor: u32,
}

impl Default for PairingParams {
    fn default() -> Self {
        Self {
            min_frag_len: defaults::MIN_FRAG_LEN,
            max_frag_len: defaults::MAX_FRAG_LEN,
            policy: PairingPolicy::default(),
            overlap: true,
            anchor: defaults::ANCHOR_MATE,
        }
    }
}

impl PairingParams {
    /// Mate index of the opposite read set
    #[inline]
    pub fn opposite_mate(&self) -> u32 {
        if self.anchor != 0 { 0 } else { 1 }
    }
}

/// Run-time switches of the threshold policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThresholdOptions {
    /// Clamp each mate's target up to its own worst-allowed score. When off,
    /// the floor is effectively proportional to the combined pair length.
    pub clamp_to_worst: bool,
    /// Report the opposite mate's second-best end point
    pub report_second: bool,
}

impl Default for ThresholdOptions {
    fn default() -> Self {
        Self {
            clamp_to_worst: true,
            report_second: false,
        }
    }
}

/// Where the opposite mate lies relative to the anchor and its strand.
///
/// Returns `(is_left, is_forward)` for the opposite mate given the pairing
/// policy, the anchor mate index and whether the anchor aligned forward.
pub fn frame_opposite_mate(policy: PairingPolicy, anchor: u32, anchor_fw: bool) -> (bool, bool) {
    let is1 = anchor == 0;
    match policy {
        PairingPolicy::FF => (is1 != anchor_fw, anchor_fw),
        PairingPolicy::RR => (is1 == anchor_fw, anchor_fw),
        PairingPolicy::FR => (!anchor_fw, !anchor_fw),
        PairingPolicy::RF => (anchor_fw, !anchor_fw),
    }
}

/// Score a new pair has to exceed: the second-best recorded pair if there is
/// one, otherwise one below the sum of the per-mate worst scores.
pub fn compute_target_score(best: &BestPairedAlignments, a_worst: i32, o_worst: i32) -> i32 {
    if best.has_second_paired() {
        best.second_paired_score()
    } else {
        a_worst.saturating_add(o_worst).saturating_sub(1)
    }
}

/// Worst-allowed and optimal score of one mate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MateBounds {
    pub worst: i32,
    pub optimal: i32,
}

/// Outcome of the threshold policy for one mate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MateThreshold {
    pub target_pair_score: i32,
    /// Final minimum score for this mate
    pub min_score: i32,
    /// False when `min_score` exceeds the mate's optimal score
    pub reachable: bool,
}

/// Apply the pair threshold policy to one mate.
pub fn mate_threshold(
    pair_floor: i32,
    this: MateBounds,
    other: MateBounds,
    other_contribution: i32,
    score_limit: i32,
    options: ThresholdOptions,
) -> MateThreshold {
    let target_pair_score = pair_floor
        .saturating_add(1)
        .min(this.optimal.saturating_add(other.optimal));

    let mut target_mate = target_pair_score.saturating_sub(other_contribution);
    if options.clamp_to_worst {
        target_mate = target_mate.max(this.worst);
    }

    let min_score = target_mate.max(score_limit);
    MateThreshold {
        target_pair_score,
        min_score,
        reachable: min_score <= this.optimal,
    }
}

/// Anchor pass: the opposite mate is optimistically assumed perfect.
pub fn anchor_threshold(
    best: &BestPairedAlignments,
    anchor: MateBounds,
    opposite: MateBounds,
    score_limit: i32,
    options: ThresholdOptions,
) -> MateThreshold {
    let floor = compute_target_score(best, anchor.worst, opposite.worst);
    mate_threshold(floor, anchor, opposite, opposite.optimal, score_limit, options)
}

/// Opposite pass: the anchor's achieved score is known.
pub fn opposite_threshold(
    best: &BestPairedAlignments,
    anchor: MateBounds,
    opposite: MateBounds,
    anchor_score: i32,
    score_limit: i32,
    options: ThresholdOptions,
) -> MateThreshold {
    let floor = compute_target_score(best, anchor.worst, opposite.worst);
    mate_threshold(floor, opposite, anchor, anchor_score, score_limit, options)
}
