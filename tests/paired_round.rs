// tests/paired_round.rs
// Paired-end rounds: anchor pass, opposite-mate window search, dedup against
// recorded alignments and unreachable thresholds.

use ferrous_score::core::alignment::executor::ScalarBatchExecutor;
use ferrous_score::core::alignment::scoring::{ScoringScheme, WORST_SCORE};
use ferrous_score::core::alignment::workspace::DpScratch;
use ferrous_score::core::compute::encoding::encode_sequence;
use ferrous_score::pipelines::scoring::{
    Alignment, BestAlignmentTable, BestAlignments, HitRecord, PairedState, PairingParams, PairingPolicy,
    PipelineState, ReadSet, ThresholdOptions, run_paired_round,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const READ_LEN: usize = 50;

fn random_genome(len: usize, seed: u64) -> Vec<u8> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..len).map(|_| b"ACGT"[rng.random_range(0..4)]).collect()
}

fn revcomp_ascii(seq: &[u8]) -> Vec<u8> {
    seq.iter()
        .rev()
        .map(|&b| match b {
            b'A' => b'T',
            b'C' => b'G',
            b'G' => b'C',
            _ => b'A',
        })
        .collect()
}

fn fr_params() -> PairingParams {
    PairingParams {
        min_frag_len: 0,
        max_frag_len: 500,
        policy: PairingPolicy::FR,
        overlap: true,
        anchor: 0,
    }
}

struct Pairs {
    genome: Vec<u8>,
    reads: ReadSet,
    reads_o: ReadSet,
}

/// Pair 0: mate 1 forward at 1000, mate 2 reverse at 1300
/// Pair 1: mate 1 reverse at 5000, mate 2 forward at 4700
fn pairs() -> Pairs {
    let ascii = random_genome(10_000, 21);
    let m1 = [
        ascii[1000..1000 + READ_LEN].to_vec(),
        revcomp_ascii(&ascii[5000..5000 + READ_LEN]),
    ];
    let m2 = [
        revcomp_ascii(&ascii[1300..1300 + READ_LEN]),
        ascii[4700..4700 + READ_LEN].to_vec(),
    ];
    Pairs {
        genome: encode_sequence(&ascii),
        reads: ReadSet::from_ascii(m1.iter().map(|s| s.as_slice())),
        reads_o: ReadSet::from_ascii(m2.iter().map(|s| s.as_slice())),
    }
}

fn paired_state<'a>(
    p: &'a Pairs,
    idx_queue: &'a [u32],
    best: &'a BestAlignmentTable,
    best_o: &'a BestAlignmentTable,
    scheme: &'a ScoringScheme,
    score_limit: i32,
    options: ThresholdOptions,
) -> PairedState<'a> {
    PairedState {
        base: PipelineState {
            reads: &p.reads,
            genome: &p.genome,
            idx_queue,
            best,
            scheme,
            score_limit,
        },
        reads_o: &p.reads_o,
        best_o,
        pairing: fr_params(),
        options,
    }
}

#[test]
fn test_paired_round_finds_both_mates() {
    let p = pairs();
    let scheme = ScoringScheme::end_to_end();
    let best = BestAlignmentTable::new(2);
    let best_o = BestAlignmentTable::new(2);
    let idx_queue = vec![0, 1];
    let mut hits = vec![HitRecord::new(0, false, 1000), HitRecord::new(1, true, 5000)];
    let mut scratch = DpScratch::with_capacity(1 << 16);

    let state = paired_state(&p, &idx_queue, &best, &best_o, &scheme, WORST_SCORE, ThresholdOptions::default());
    let summary = run_paired_round(&ScalarBatchExecutor, 15, state, &mut hits, &mut scratch);

    assert_eq!(summary.anchors_scored, 2);
    assert_eq!(summary.pairs_scored, 2);
    assert_eq!(summary.opposite.accepted, 2);

    // forward anchor: opposite window opens at the anchor and runs right
    assert_eq!(hits[0].score, 0);
    assert_eq!(hits[0].mate, 0);
    assert_eq!(hits[0].sink, 1049);
    assert_eq!(hits[0].opposite_loc, 1000);
    assert_eq!(hits[0].opposite_score, 0);
    assert_eq!(hits[0].opposite_sink, 1349);

    // reverse anchor: opposite window ends at the anchor end
    assert_eq!(hits[1].score, 0);
    assert_eq!(hits[1].opposite_loc, 5050 - 500);
    assert_eq!(hits[1].opposite_score, 0);
    assert_eq!(hits[1].opposite_sink, 4749);

    // second-best reporting is off
    assert!(hits.iter().all(|h| h.opposite_score2 == WORST_SCORE));
    assert!(hits.iter().all(|h| h.opposite_sink2 == h.opposite_loc));
}

#[test]
fn test_report_second_finds_distant_end() {
    // the opposite mate occurs twice in its window, 200 bases apart
    let mut ascii = random_genome(10_000, 5);
    let copy = ascii[1300..1300 + READ_LEN].to_vec();
    ascii[1100..1100 + READ_LEN].copy_from_slice(&copy);
    let p = Pairs {
        genome: encode_sequence(&ascii),
        reads: ReadSet::from_ascii([&ascii[1000..1000 + READ_LEN]]),
        reads_o: ReadSet::from_ascii([&revcomp_ascii(&copy)[..]]),
    };
    let scheme = ScoringScheme::end_to_end();
    let best = BestAlignmentTable::new(1);
    let best_o = BestAlignmentTable::new(1);
    let idx_queue = vec![0];
    let mut hits = vec![HitRecord::new(0, false, 1000)];
    let mut scratch = DpScratch::with_capacity(1 << 16);
    let options = ThresholdOptions {
        report_second: true,
        ..Default::default()
    };

    let state = paired_state(&p, &idx_queue, &best, &best_o, &scheme, WORST_SCORE, options);
    run_paired_round(&ScalarBatchExecutor, 15, state, &mut hits, &mut scratch);

    // both copies score 0; the earlier column is kept as the best
    assert_eq!(hits[0].opposite_score, 0);
    assert_eq!(hits[0].opposite_sink, 1149);
    assert_eq!(hits[0].opposite_score2, 0);
    assert_eq!(hits[0].opposite_sink2, 1349);
}

#[test]
fn test_recorded_opposite_location_is_skipped() {
    let p = pairs();
    let scheme = ScoringScheme::end_to_end();
    let best = BestAlignmentTable::new(2);
    let mut best_o = BestAlignmentTable::new(2);
    // pair 1: mate 2 already recorded forward at the anchor's location
    best_o.update(1, Alignment::new(5000, 0, -5, false).with_mate(1, false));
    let idx_queue = vec![0];
    let mut hits = vec![HitRecord::new(1, true, 5000)];
    let mut scratch = DpScratch::with_capacity(1 << 16);

    let state = paired_state(&p, &idx_queue, &best, &best_o, &scheme, WORST_SCORE, ThresholdOptions::default());
    let summary = run_paired_round(&ScalarBatchExecutor, 15, state, &mut hits, &mut scratch);

    // the anchor itself is new and scores
    assert_eq!(hits[0].score, 0);
    assert_eq!(summary.anchors_scored, 1);
    // the opposite search is deduplicated away
    assert_eq!(summary.opposite.offered, 1);
    assert_eq!(summary.opposite.accepted, 0);
    assert_eq!(hits[0].opposite_score, WORST_SCORE);
    assert_eq!(summary.pairs_scored, 0);
}

#[test]
fn test_recorded_anchor_location_is_skipped() {
    let p = pairs();
    let scheme = ScoringScheme::end_to_end();
    let mut best = BestAlignmentTable::new(2);
    best.update(0, Alignment::new(1000, 0, 0, false).with_mate(0, true));
    let best_o = BestAlignmentTable::new(2);
    let idx_queue = vec![0];
    let mut hits = vec![HitRecord::new(0, false, 1000)];
    let mut scratch = DpScratch::with_capacity(1 << 16);

    let state = paired_state(&p, &idx_queue, &best, &best_o, &scheme, WORST_SCORE, ThresholdOptions::default());
    let summary = run_paired_round(&ScalarBatchExecutor, 15, state, &mut hits, &mut scratch);

    assert_eq!(summary.anchor.accepted, 0);
    assert_eq!(summary.anchors_scored, 0);
    assert_eq!(hits[0].score, WORST_SCORE);
}

#[test]
fn test_unreachable_threshold_skips_dp() {
    let p = pairs();
    let scheme = ScoringScheme::end_to_end();
    let best = BestAlignmentTable::new(2);
    let best_o = BestAlignmentTable::new(2);
    let idx_queue = vec![0, 1];
    let mut hits = vec![HitRecord::new(0, false, 1000), HitRecord::new(1, true, 5000)];
    let mut scratch = DpScratch::with_capacity(1 << 16);

    // end-to-end perfect score is 0: a floor of 1 can never be met
    let state = paired_state(&p, &idx_queue, &best, &best_o, &scheme, 1, ThresholdOptions::default());
    let summary = run_paired_round(&ScalarBatchExecutor, 15, state, &mut hits, &mut scratch);

    assert_eq!(summary.anchor.offered, 2);
    assert_eq!(summary.anchor.accepted, 0);
    assert_eq!(summary.opposite.offered, 0);
    assert!(hits.iter().all(|h| h.score == WORST_SCORE && h.opposite_score == WORST_SCORE));
}

#[test]
fn test_second_pair_floor_filters_weak_anchor() {
    let ascii = random_genome(10_000, 33);
    let mut anchor = ascii[2000..2000 + READ_LEN].to_vec();
    anchor[10] = if anchor[10] == b'A' { b'C' } else { b'A' };
    let p = Pairs {
        genome: encode_sequence(&ascii),
        reads: ReadSet::from_ascii([&anchor[..]]),
        reads_o: ReadSet::from_ascii([&revcomp_ascii(&ascii[2200..2200 + READ_LEN])[..]]),
    };
    let scheme = ScoringScheme::end_to_end();
    // a recorded second-best pair scoring -2 + -2
    let mut best = BestAlignmentTable::new(1);
    best.set(
        0,
        BestAlignments::new(
            Alignment::new(10, 0, 0, false).with_mate(0, true),
            Alignment::new(20, 0, -2, false).with_mate(0, true),
        ),
    );
    let mut best_o = BestAlignmentTable::new(1);
    best_o.set(
        0,
        BestAlignments::new(
            Alignment::new(30, 0, 0, true).with_mate(1, true),
            Alignment::new(40, 0, -2, true).with_mate(1, true),
        ),
    );
    let idx_queue = vec![0];
    let mut hits = vec![HitRecord::new(0, false, 2000)];
    let mut scratch = DpScratch::with_capacity(1 << 16);

    let state = paired_state(&p, &idx_queue, &best, &best_o, &scheme, WORST_SCORE, ThresholdOptions::default());
    let summary = run_paired_round(&ScalarBatchExecutor, 15, state, &mut hits, &mut scratch);

    // the anchor needs -3 (one above -4, opposite assumed perfect); it scores -6
    assert_eq!(summary.anchor.accepted, 1);
    assert_eq!(hits[0].score, WORST_SCORE);
    assert_eq!(summary.anchors_scored, 0);
    assert_eq!(summary.opposite.offered, 0);
}

#[test]
fn test_rerun_resets_queued_hits() {
    let p = pairs();
    let scheme = ScoringScheme::end_to_end();
    let best = BestAlignmentTable::new(2);
    let best_o = BestAlignmentTable::new(2);
    let idx_queue = vec![0];
    let mut hits = vec![HitRecord::new(0, false, 1000)];
    hits[0].opposite_score = 5;
    let mut scratch = DpScratch::with_capacity(1 << 16);

    let state = paired_state(&p, &idx_queue, &best, &best_o, &scheme, 1, ThresholdOptions::default());
    run_paired_round(&ScalarBatchExecutor, 15, state, &mut hits, &mut scratch);

    // stale opposite fields from an earlier round do not survive
    assert_eq!(hits[0].opposite_score, WORST_SCORE);
}

#[test]
fn test_empty_opposite_window_is_skipped() {
    let p = pairs();
    let scheme = ScoringScheme::end_to_end();
    let best = BestAlignmentTable::new(2);
    let best_o = BestAlignmentTable::new(2);
    let idx_queue = vec![0, 1];
    let mut hits = vec![HitRecord::new(0, false, 1000), HitRecord::new(1, true, 5000)];
    let mut scratch = DpScratch::with_capacity(1 << 16);

    // a minimum fragment beyond the maximum leaves no room for the mate
    let mut state = paired_state(&p, &idx_queue, &best, &best_o, &scheme, WORST_SCORE, ThresholdOptions::default());
    state.pairing.min_frag_len = 700;
    let summary = run_paired_round(&ScalarBatchExecutor, 15, state, &mut hits, &mut scratch);

    assert_eq!(summary.anchors_scored, 2);
    assert_eq!(summary.opposite.offered, 2);
    assert_eq!(summary.opposite.accepted, 0);
    assert_eq!(summary.pairs_scored, 0);
    for hit in &hits {
        assert_eq!(hit.score, 0);
        assert_eq!(hit.opposite_loc, 0);
        assert_eq!(hit.opposite_score, WORST_SCORE);
        assert_eq!(hit.opposite_sink, 0);
        assert_eq!(hit.opposite_score2, WORST_SCORE);
    }
}

#[test]
fn test_opposite_window_past_genome_end_is_skipped() {
    let ascii = random_genome(2_000, 13);
    let p = Pairs {
        genome: encode_sequence(&ascii),
        reads: ReadSet::from_ascii([&ascii[1940..1990]]),
        reads_o: ReadSet::from_ascii([&revcomp_ascii(&ascii[100..150])[..]]),
    };
    let scheme = ScoringScheme::end_to_end();
    let best = BestAlignmentTable::new(1);
    let best_o = BestAlignmentTable::new(1);
    let idx_queue = vec![0];
    let mut hits = vec![HitRecord::new(0, false, 1940)];
    let mut scratch = DpScratch::with_capacity(1 << 16);

    // the right-hand window would open at 1940 + 200 - 58, past the genome
    let mut state = paired_state(&p, &idx_queue, &best, &best_o, &scheme, WORST_SCORE, ThresholdOptions::default());
    state.pairing.min_frag_len = 200;
    let summary = run_paired_round(&ScalarBatchExecutor, 15, state, &mut hits, &mut scratch);

    assert_eq!(hits[0].score, 0);
    assert_eq!(summary.opposite.offered, 1);
    assert_eq!(summary.opposite.accepted, 0);
    assert_eq!(hits[0].opposite_loc, 0);
    assert_eq!(hits[0].opposite_score, WORST_SCORE);
}

#[test]
fn test_paired_order_does_not_change_results() {
    let ascii = random_genome(20_000, 8);
    let mut rng = StdRng::seed_from_u64(41);

    let mut m1 = Vec::new();
    let mut m2 = Vec::new();
    let mut hits = Vec::new();
    for k in 0..32u32 {
        let pos = rng.random_range(1000..18_000usize);
        let jitter = rng.random_range(0..5u32);
        let rc = k % 2 == 1;
        if rc {
            m1.push(revcomp_ascii(&ascii[pos..pos + READ_LEN]));
            m2.push(ascii[pos - 300..pos - 300 + READ_LEN].to_vec());
        } else {
            m1.push(ascii[pos..pos + READ_LEN].to_vec());
            m2.push(revcomp_ascii(&ascii[pos + 300..pos + 300 + READ_LEN]));
        }
        hits.push(HitRecord::new(k, rc, pos as u32 - jitter));
        // a second seed for some reads
        if k % 4 == 0 {
            hits.push(HitRecord::new(k, rc, pos as u32 + 2));
        }
    }
    let p = Pairs {
        genome: encode_sequence(&ascii),
        reads: ReadSet::from_ascii(m1.iter().map(|s| s.as_slice())),
        reads_o: ReadSet::from_ascii(m2.iter().map(|s| s.as_slice())),
    };
    let scheme = ScoringScheme::end_to_end();
    let best = BestAlignmentTable::new(32);
    let best_o = BestAlignmentTable::new(32);
    let options = ThresholdOptions {
        report_second: true,
        ..Default::default()
    };

    let run = |idx_queue: &[u32], cells: usize| -> Vec<HitRecord> {
        let mut arena = hits.clone();
        let state = paired_state(&p, idx_queue, &best, &best_o, &scheme, WORST_SCORE, options);
        let mut scratch = DpScratch::with_capacity(cells);
        run_paired_round(&ScalarBatchExecutor, 15, state, &mut arena, &mut scratch);
        arena
    };

    let ordered: Vec<u32> = (0..hits.len() as u32).collect();
    let reference = run(&ordered, 1 << 16);

    let mut shuffled_queue = ordered.clone();
    shuffled_queue.shuffle(&mut rng);
    // small scratch forces several waves in both passes
    let shuffled = run(&shuffled_queue, 2 * 1024);

    assert_eq!(reference, shuffled);
    assert!(reference.iter().all(|h| h.score == 0 && h.opposite_score == 0));
}
