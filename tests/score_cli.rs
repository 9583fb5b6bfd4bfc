// tests/score_cli.rs
// End-to-end runs of the scoring driver over FASTA/FASTQ/hit-table files.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use ferrous_score::score::main_score;
use ferrous_score::score_opt::{RoundMode, ScoreOpt};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tempfile::TempDir;

fn random_seq(len: usize, seed: u64) -> Vec<u8> {
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

fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    let mut file = fs::File::create(&path).unwrap();
    file.write_all(content).unwrap();
    path
}

fn fastq(records: &[(&str, &[u8])]) -> Vec<u8> {
    let mut out = Vec::new();
    for (name, seq) in records {
        out.extend_from_slice(format!("@{}\n", name).as_bytes());
        out.extend_from_slice(seq);
        out.extend_from_slice(b"\n+\n");
        out.extend(std::iter::repeat_n(b'I', seq.len()));
        out.push(b'\n');
    }
    out
}

/// chr1 (3000 bp) and chr2 (2000 bp) as a FASTA file
fn reference(dir: &Path) -> (PathBuf, Vec<u8>, Vec<u8>) {
    let chr1 = random_seq(3000, 1);
    let chr2 = random_seq(2000, 2);
    let mut fa = b">chr1\n".to_vec();
    fa.extend_from_slice(&chr1);
    fa.extend_from_slice(b"\n>chr2 second contig\n");
    fa.extend_from_slice(&chr2);
    fa.push(b'\n');
    (write_file(dir, "ref.fa", &fa), chr1, chr2)
}

fn data_lines(path: &Path) -> Vec<String> {
    fs::read_to_string(path)
        .unwrap()
        .lines()
        .filter(|l| !l.starts_with('#'))
        .map(str::to_string)
        .collect()
}

#[test]
fn test_single_end_best_report() {
    let dir = TempDir::new().unwrap();
    let (ref_path, chr1, chr2) = reference(dir.path());
    let reads = write_file(
        dir.path(),
        "reads.fq",
        &fastq(&[
            ("r0", &chr1[100..150]),
            ("r1", &revcomp_ascii(&chr2[400..450])[..]),
        ]),
    );
    let hits = write_file(
        dir.path(),
        "hits.tsv",
        b"# read\tstrand\tcontig\tpos\n0\t+\tchr1\t100\n1\t-\tchr2\t400\n1\t+\tchrUn\t5\n",
    );
    let out = dir.path().join("out.tsv");

    main_score(&ref_path, &hits, &[reads], Some(out.as_path()), &ScoreOpt::default()).unwrap();

    assert_eq!(
        data_lines(&out),
        vec!["r0\t1\t+\tchr1\t100\t0\t149", "r1\t1\t-\tchr2\t400\t0\t449"]
    );
}

#[test]
fn test_single_end_report_honours_score_min() {
    let dir = TempDir::new().unwrap();
    let (ref_path, chr1, _) = reference(dir.path());
    let reads = write_file(
        dir.path(),
        "reads.fq",
        &fastq(&[("good", &chr1[300..350]), ("junk", &[b'C'; 50][..])]),
    );
    let hits = write_file(dir.path(), "hits.tsv", b"0\t+\tchr1\t300\n1\t+\tchr1\t500\n");
    let out = dir.path().join("out.tsv");

    main_score(&ref_path, &hits, &[reads], Some(out.as_path()), &ScoreOpt::default()).unwrap();

    // poly-C aligns far below L,-0.6,-0.6 at 50 bases (-30)
    assert_eq!(
        data_lines(&out),
        vec!["good\t1\t+\tchr1\t300\t0\t349", "junk\t1\t+\tchr1\t500\t*\t*"]
    );
}

#[test]
fn test_paired_report() {
    let dir = TempDir::new().unwrap();
    let (ref_path, chr1, _) = reference(dir.path());
    let m1 = write_file(dir.path(), "r1.fq", &fastq(&[("p0", &chr1[1000..1050])]));
    let m2 = write_file(
        dir.path(),
        "r2.fq",
        &fastq(&[("p0", &revcomp_ascii(&chr1[1250..1300])[..])]),
    );
    let hits = write_file(dir.path(), "hits.tsv", b"0\t+\tchr1\t1000\n");
    let out = dir.path().join("out.tsv");

    main_score(&ref_path, &hits, &[m1, m2], Some(out.as_path()), &ScoreOpt::default()).unwrap();

    assert_eq!(
        data_lines(&out),
        vec!["p0\t1\t+\tchr1\t1000\t0\t1049\t1000\t0\t1299"]
    );
}

#[test]
fn test_all_mode_report() {
    let dir = TempDir::new().unwrap();
    let (ref_path, chr1, _) = reference(dir.path());
    let reads = write_file(dir.path(), "reads.fq", &fastq(&[("r0", &chr1[200..240])]));
    let hits = write_file(dir.path(), "hits.tsv", b"0\t+\tchr1\t200\n0\t+\tchr1\t2000\n");
    let out = dir.path().join("out.tsv");
    let opt = ScoreOpt {
        round_mode: RoundMode::All,
        ..Default::default()
    };

    main_score(&ref_path, &hits, &[reads], Some(out.as_path()), &opt).unwrap();

    assert_eq!(data_lines(&out), vec!["r0\t+\tchr1\t200\t0"]);
}

#[test]
fn test_all_mode_rejects_pairs() {
    let dir = TempDir::new().unwrap();
    let (ref_path, chr1, _) = reference(dir.path());
    let m1 = write_file(dir.path(), "r1.fq", &fastq(&[("p0", &chr1[0..50])]));
    let m2 = write_file(dir.path(), "r2.fq", &fastq(&[("p0", &chr1[100..150])]));
    let hits = write_file(dir.path(), "hits.tsv", b"0\t+\tchr1\t0\n");
    let opt = ScoreOpt {
        round_mode: RoundMode::All,
        ..Default::default()
    };

    assert!(main_score(&ref_path, &hits, &[m1, m2], None, &opt).is_err());
}

#[test]
fn test_missing_reference_is_an_error() {
    let dir = TempDir::new().unwrap();
    let reads = write_file(dir.path(), "reads.fq", &fastq(&[("r0", &b"ACGT"[..])]));
    let hits = write_file(dir.path(), "hits.tsv", b"");
    let err = main_score(
        &dir.path().join("missing.fa"),
        &hits,
        &[reads],
        None,
        &ScoreOpt::default(),
    )
    .unwrap_err();
    assert!(format!("{:#}", err).contains("missing.fa"));
}
