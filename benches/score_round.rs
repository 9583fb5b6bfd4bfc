// benches/score_round.rs
// Criterion benchmarks for best-score and paired rounds over synthetic hits.

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rand::{Rng, SeedableRng, rngs::StdRng};

use ferrous_score::core::alignment::executor::ScalarBatchExecutor;
use ferrous_score::core::alignment::scoring::{ScoringScheme, WORST_SCORE};
use ferrous_score::core::alignment::workspace::DpScratch;
use ferrous_score::core::compute::encoding::{encode_sequence, reverse_complement};
use ferrous_score::pipelines::scoring::{
    BestAlignmentTable, HitRecord, PairedState, PairingParams, PipelineState, ReadSet, ThresholdOptions,
    run_paired_round, run_single_end_round,
};

const GENOME_LEN: usize = 1 << 20;

fn make_genome(rng: &mut StdRng) -> Vec<u8> {
    let ascii: Vec<u8> = (0..GENOME_LEN).map(|_| b"ACGT"[rng.random_range(0..4)]).collect();
    encode_sequence(&ascii)
}

/// `n` reads sampled from the genome, a third of them with one mismatch,
/// and one hit per read at its true location.
fn make_reads(rng: &mut StdRng, genome: &[u8], n: usize, len: usize) -> (ReadSet, Vec<HitRecord>) {
    let mut reads = ReadSet::new();
    let mut hits = Vec::with_capacity(n);
    for k in 0..n {
        let pos = rng.random_range(0..GENOME_LEN - 1000);
        let mut read = genome[pos..pos + len].to_vec();
        if k % 3 == 0 {
            let at = rng.random_range(0..len);
            read[at] = (read[at] + 1) % 4;
        }
        let rc = k % 2 == 1;
        if rc {
            read = reverse_complement(&read);
        }
        let id = reads.push_encoded(&read);
        hits.push(HitRecord::new(id, rc, pos as u32));
    }
    (reads, hits)
}

fn bench_single_end(c: &mut Criterion) {
    let mut group = c.benchmark_group("single_end_round");
    let mut rng = StdRng::seed_from_u64(0xDEADBEEFCAFEBABE);
    let genome = make_genome(&mut rng);
    let scheme = ScoringScheme::end_to_end();

    for (n, len, band) in [(4096usize, 100usize, 15u32), (4096, 150, 15), (4096, 150, 31)] {
        let (reads, hits) = make_reads(&mut rng, &genome, n, len);
        let best = BestAlignmentTable::new(reads.len());
        let idx_queue: Vec<u32> = (0..n as u32).collect();
        let mut scratch = DpScratch::default();

        group.throughput(Throughput::Elements(n as u64));
        group.bench_function(format!("len{}_band{}", len, band), |b| {
            b.iter_batched(
                || hits.clone(),
                |mut arena| {
                    let state = PipelineState {
                        reads: &reads,
                        genome: &genome,
                        idx_queue: &idx_queue,
                        best: &best,
                        scheme: &scheme,
                        score_limit: WORST_SCORE,
                    };
                    black_box(run_single_end_round(
                        &ScalarBatchExecutor,
                        band,
                        state,
                        &mut arena,
                        &mut scratch,
                    ))
                },
                BatchSize::LargeInput,
            )
        });
    }
    group.finish();
}

fn bench_paired(c: &mut Criterion) {
    let mut group = c.benchmark_group("paired_round");
    let mut rng = StdRng::seed_from_u64(0x5EED);
    let genome = make_genome(&mut rng);
    let scheme = ScoringScheme::end_to_end();
    let n = 1024usize;
    let len = 100usize;

    // opposite mates 300bp downstream, reverse strand
    let mut reads = ReadSet::new();
    let mut reads_o = ReadSet::new();
    let mut hits = Vec::with_capacity(n);
    for _ in 0..n {
        let pos = rng.random_range(0..GENOME_LEN - 1000);
        let id = reads.push_encoded(&genome[pos..pos + len]);
        reads_o.push_encoded(&reverse_complement(&genome[pos + 300..pos + 300 + len]));
        hits.push(HitRecord::new(id, false, pos as u32));
    }
    let best = BestAlignmentTable::new(n);
    let best_o = BestAlignmentTable::new(n);
    let idx_queue: Vec<u32> = (0..n as u32).collect();
    let mut scratch = DpScratch::default();

    group.throughput(Throughput::Elements(n as u64));
    group.bench_function("fr_len100_frag500", |b| {
        b.iter_batched(
            || hits.clone(),
            |mut arena| {
                let state = PairedState {
                    base: PipelineState {
                        reads: &reads,
                        genome: &genome,
                        idx_queue: &idx_queue,
                        best: &best,
                        scheme: &scheme,
                        score_limit: WORST_SCORE,
                    },
                    reads_o: &reads_o,
                    best_o: &best_o,
                    pairing: PairingParams::default(),
                    options: ThresholdOptions::default(),
                };
                black_box(run_paired_round(&ScalarBatchExecutor, 15, state, &mut arena, &mut scratch))
            },
            BatchSize::LargeInput,
        )
    });
    group.finish();
}

criterion_group!(benches, bench_single_end, bench_paired);
criterion_main!(benches);
