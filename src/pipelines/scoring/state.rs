// Round-scoped scoring state
//
// Everything a scoring round reads or writes, as plain arenas:
// - ReadSet: concatenated encoded reads, addressed by read id
// - HitRecord: one seed-derived candidate, mutated in place by one stream
// - BestAlignmentTable: best/second-best alignment per read, maintained
//   between rounds by the selection stage
// - PipelineState / PairedState: borrowed views handed to the streams
//
// The hit arena itself is never part of the state; it is passed to the
// executor separately so `output` can take exclusive access per record.

use crate::core::alignment::scoring::{ScoringScheme, WORST_SCORE};
use crate::core::alignment::stream::ReadRange;
use crate::core::compute::encoding::encode_into;

use super::pairing::{PairingParams, ThresholdOptions};

/// Concatenated, numerically encoded reads.
#[derive(Debug, Clone)]
pub struct ReadSet {
    bases: Vec<u8>,
    /// offsets[k]..offsets[k + 1] is read k
    offsets: Vec<u32>,
    max_read_len: u32,
}

impl Default for ReadSet {
    fn default() -> Self {
        Self {
            bases: Vec::new(),
            offsets: vec![0],
            max_read_len: 0,
        }
    }
}

impl ReadSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from ASCII sequences
    pub fn from_ascii<'s, I>(seqs: I) -> Self
    where
        I: IntoIterator<Item = &'s [u8]>,
    {
        let mut set = Self::new();
        for seq in seqs {
            set.push_ascii(seq);
        }
        set
    }

    /// Append one ASCII read; returns its read id
    pub fn push_ascii(&mut self, seq: &[u8]) -> u32 {
        encode_into(seq, &mut self.bases);
        self.close_read()
    }

    /// Append one already-encoded read; returns its read id
    pub fn push_encoded(&mut self, codes: &[u8]) -> u32 {
        self.bases.extend_from_slice(codes);
        self.close_read()
    }

    fn close_read(&mut self) -> u32 {
        let begin = self.offsets.last().copied().unwrap_or(0);
        let end = self.bases.len() as u32;
        self.max_read_len = self.max_read_len.max(end - begin);
        self.offsets.push(end);
        (self.offsets.len() - 2) as u32
    }

    pub fn len(&self) -> usize {
        self.offsets.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Coordinate range of `read_id`; empty for unknown ids
    #[inline]
    pub fn get_range(&self, read_id: u32) -> ReadRange {
        let k = read_id as usize;
        match (self.offsets.get(k), self.offsets.get(k + 1)) {
            (Some(&b), Some(&e)) => ReadRange::new(b, e),
            _ => ReadRange::default(),
        }
    }

    #[inline]
    pub fn read_len(&self, read_id: u32) -> u32 {
        self.get_range(read_id).len()
    }

    /// Encoded bases of a coordinate range
    #[inline]
    pub fn sequence(&self, range: ReadRange) -> &[u8] {
        &self.bases[range.begin as usize..range.end as usize]
    }

    pub fn read(&self, read_id: u32) -> &[u8] {
        self.sequence(self.get_range(read_id))
    }

    pub fn max_read_len(&self) -> u32 {
        self.max_read_len
    }
}

/// One candidate (read, strand, location), updated in place by scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitRecord {
    pub read_id: u32,
    /// Mate whose read was scored at `loc` (0 for single-end rounds)
    pub mate: u32,
    /// Read aligns as its reverse complement
    pub rc: bool,
    /// Seed-derived genome location
    pub loc: u32,
    pub score: i32,
    /// Genome coordinate of the best end cell
    pub sink: u32,
    pub opposite_loc: u32,
    pub opposite_score: i32,
    pub opposite_sink: u32,
    pub opposite_score2: i32,
    pub opposite_sink2: u32,
}

impl HitRecord {
    pub fn new(read_id: u32, rc: bool, loc: u32) -> Self {
        Self {
            read_id,
            mate: 0,
            rc,
            loc,
            score: WORST_SCORE,
            sink: 0,
            opposite_loc: 0,
            opposite_score: WORST_SCORE,
            opposite_sink: 0,
            opposite_score2: WORST_SCORE,
            opposite_sink2: 0,
        }
    }

    pub fn is_scored(&self) -> bool {
        self.score != WORST_SCORE
    }
}

/// A reported alignment slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Alignment {
    pub pos: u32,
    /// Edit distance (0 when only the score is known)
    pub ed: u32,
    pub score: i32,
    pub rc: bool,
    pub mate: u32,
    pub paired: bool,
}

impl Alignment {
    pub fn new(pos: u32, ed: u32, score: i32, rc: bool) -> Self {
        Self {
            pos,
            ed,
            score,
            rc,
            mate: 0,
            paired: false,
        }
    }

    pub fn with_mate(mut self, mate: u32, paired: bool) -> Self {
        self.mate = mate;
        self.paired = paired;
        self
    }

    /// Empty slot; never matches a real (mate, strand, location)
    pub fn invalid() -> Self {
        Self {
            pos: u32::MAX,
            ed: u32::MAX,
            score: WORST_SCORE,
            rc: false,
            mate: u32::MAX,
            paired: false,
        }
    }

    #[inline]
    pub fn is_aligned(&self) -> bool {
        self.score != WORST_SCORE
    }

    /// Same mate, strand and location
    #[inline]
    pub fn is_at(&self, mate: u32, rc: bool, pos: u32) -> bool {
        self.mate == mate && self.rc == rc && self.pos == pos
    }
}

impl Default for Alignment {
    fn default() -> Self {
        Self::invalid()
    }
}

/// Best and second-best alignment of one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BestAlignments {
    pub best: Alignment,
    pub second: Alignment,
}

impl BestAlignments {
    pub fn new(best: Alignment, second: Alignment) -> Self {
        Self { best, second }
    }
}

/// Best/second-best alignments of both mates of a pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BestPairedAlignments {
    pub anchor: BestAlignments,
    pub opposite: BestAlignments,
}

impl BestPairedAlignments {
    pub fn new(anchor: BestAlignments, opposite: BestAlignments) -> Self {
        Self { anchor, opposite }
    }

    /// The four recorded slots, best first: a1, o1, a2, o2
    pub fn slots(&self) -> [&Alignment; 4] {
        [
            &self.anchor.best,
            &self.opposite.best,
            &self.anchor.second,
            &self.opposite.second,
        ]
    }

    /// Whether (mate, strand, location) was already recorded in any slot
    pub fn has_visited(&self, mate: u32, rc: bool, pos: u32) -> bool {
        self.slots().iter().any(|a| a.is_at(mate, rc, pos))
    }

    pub fn has_second_paired(&self) -> bool {
        self.anchor.second.is_aligned() && self.opposite.second.is_aligned() && self.anchor.second.paired
    }

    /// Combined score of the second-best pair
    pub fn second_paired_score(&self) -> i32 {
        self.anchor.second.score.saturating_add(self.opposite.second.score)
    }
}

/// Best/second-best alignment per read id of one read set.
#[derive(Debug, Clone, Default)]
pub struct BestAlignmentTable {
    best: Vec<Alignment>,
    second: Vec<Alignment>,
}

impl BestAlignmentTable {
    /// Table of `n_reads` empty entries
    pub fn new(n_reads: usize) -> Self {
        Self {
            best: vec![Alignment::invalid(); n_reads],
            second: vec![Alignment::invalid(); n_reads],
        }
    }

    pub fn len(&self) -> usize {
        self.best.len()
    }

    pub fn is_empty(&self) -> bool {
        self.best.is_empty()
    }

    /// Entries of `read_id`; empty slots for unknown ids
    pub fn get(&self, read_id: u32) -> BestAlignments {
        let k = read_id as usize;
        BestAlignments {
            best: self.best.get(k).copied().unwrap_or_default(),
            second: self.second.get(k).copied().unwrap_or_default(),
        }
    }

    #[inline]
    pub fn second_best(&self, read_id: u32) -> Alignment {
        self.second.get(read_id as usize).copied().unwrap_or_default()
    }

    pub fn set(&mut self, read_id: u32, entry: BestAlignments) {
        let k = read_id as usize;
        if k < self.best.len() {
            self.best[k] = entry.best;
            self.second[k] = entry.second;
        }
    }

    /// Offer a new alignment; keeps the two highest scores per read
    pub fn update(&mut self, read_id: u32, aln: Alignment) {
        let k = read_id as usize;
        if k >= self.best.len() || !aln.is_aligned() {
            return;
        }
        if aln.score > self.best[k].score {
            self.second[k] = self.best[k];
            self.best[k] = aln;
        } else if aln.score > self.second[k].score {
            self.second[k] = aln;
        }
    }
}

/// Single-end (and anchor-pass) view of one scoring round.
#[derive(Debug, Clone, Copy)]
pub struct PipelineState<'a> {
    pub reads: &'a ReadSet,
    /// Encoded reference, concatenated
    pub genome: &'a [u8],
    /// Processing order: the hit-arena positions scored this round
    pub idx_queue: &'a [u32],
    pub best: &'a BestAlignmentTable,
    pub scheme: &'a ScoringScheme,
    /// Global score floor applied on top of every other threshold
    pub score_limit: i32,
}

/// Genome coordinates are 32-bit: bases past `u32::MAX` are unreachable
/// (the FASTA loader rejects such references outright).
#[inline]
fn addressable_len(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

impl<'a> PipelineState<'a> {
    #[inline]
    pub fn genome_length(&self) -> u32 {
        addressable_len(self.genome.len())
    }

    /// Encoded genome bases of [begin, end), clamped to the genome
    #[inline]
    pub fn genome_window(&self, begin: u32, end: u32) -> &'a [u8] {
        let end = (end as usize).min(self.genome.len());
        let begin = (begin as usize).min(end);
        &self.genome[begin..end]
    }
}

/// Paired-end view: the anchor-side state plus the opposite mates.
#[derive(Debug, Clone, Copy)]
pub struct PairedState<'a> {
    /// Anchor reads, anchor best table, hit queue, scheme and floor
    pub base: PipelineState<'a>,
    /// Opposite-mate reads, indexed by the same read ids
    pub reads_o: &'a ReadSet,
    pub best_o: &'a BestAlignmentTable,
    pub pairing: PairingParams,
    pub options: ThresholdOptions,
}

impl PairedState<'_> {
    /// Recorded best/second-best slots of both mates of `read_id`
    pub fn best_paired(&self, read_id: u32) -> BestPairedAlignments {
        BestPairedAlignments::new(self.base.best.get(read_id), self.best_o.get(read_id))
    }
}
