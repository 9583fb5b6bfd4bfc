// src/score.rs
//
// Main entry point for a scoring run
// Loads the reference, reads and seed hits, runs one round and writes a
// tab-separated report

use anyhow::{Context, Result, bail};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;

use crate::core::alignment::executor::ScalarBatchExecutor;
use crate::core::alignment::scoring::{ScoringScheme, WORST_SCORE};
use crate::core::alignment::workspace::DpScratch;
use crate::core::io::fasta_reader::{Reference, load_reference};
use crate::core::io::fastq_reader::{FastqReader, ReadBatch};
use crate::core::io::hit_table::{HitEntry, load_hits};
use crate::pipelines::scoring::{
    Alignment, AlignmentRing, BestAlignmentTable, HitRecord, PairedState, PipelineState, ReadSet, run_all_round,
    run_paired_round, run_single_end_round,
};
use crate::score_opt::{RoundMode, ScoreOpt};

const PKG_NAME: &str = env!("CARGO_PKG_NAME");
const PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Turn hit-table rows into the hit arena.
///
/// Rows naming an unknown contig, a position past the contig end or a read
/// index past the read set are skipped with a warning.
pub fn build_hit_arena(entries: &[HitEntry], reference: &Reference, n_reads: usize, mate: u32) -> Vec<HitRecord> {
    let mut skipped = 0usize;
    let hits: Vec<HitRecord> = entries
        .iter()
        .filter_map(|entry| {
            if entry.read_index as usize >= n_reads {
                log::warn!("Skipping hit for read {}: only {} reads loaded", entry.read_index, n_reads);
                skipped += 1;
                return None;
            }
            match reference.global_pos(&entry.contig, entry.pos) {
                Some(loc) => Some(HitRecord {
                    mate,
                    ..HitRecord::new(entry.read_index, entry.rc, loc)
                }),
                None => {
                    log::warn!(
                        "Skipping hit for read {}: {}:{} is not on the reference",
                        entry.read_index,
                        entry.contig,
                        entry.pos
                    );
                    skipped += 1;
                    None
                }
            }
        })
        .collect();

    if skipped > 0 {
        log::info!("Skipped {} of {} hits", skipped, entries.len());
    }
    hits
}

/// Demote single-end scores below the read's worst-allowed score to the
/// sentinel; returns how many were demoted.
///
/// The Best stream only filters against the second-best score and the score
/// floor, so with an empty best table it keeps any end-to-end placement.
pub fn mask_below_min_score(hits: &mut [HitRecord], reads: &ReadSet, scheme: &ScoringScheme) -> usize {
    let mut masked = 0;
    for hit in hits.iter_mut().filter(|h| h.is_scored()) {
        if hit.score < scheme.min_score(reads.read_len(hit.read_id)) {
            hit.score = WORST_SCORE;
            masked += 1;
        }
    }
    masked
}

fn read_fastq(path: &Path) -> Result<ReadBatch> {
    let path_str = path.to_string_lossy();
    let mut reader =
        FastqReader::new(&path_str).with_context(|| format!("Error opening read file {}", path.display()))?;
    reader
        .read_all()
        .with_context(|| format!("Error reading {}", path.display()))
}

fn read_set(batch: &ReadBatch) -> ReadSet {
    ReadSet::from_ascii(batch.seqs.iter().map(|s| s.as_slice()))
}

fn strand(rc: bool) -> char {
    if rc { '-' } else { '+' }
}

fn score_field(score: i32) -> String {
    if score == WORST_SCORE {
        "*".to_string()
    } else {
        score.to_string()
    }
}

/// Local offset of a global coordinate, `*` when off the reference
fn local_field(reference: &Reference, pos: u32) -> String {
    match reference.locate(pos) {
        Some((_, offset)) => offset.to_string(),
        None => "*".to_string(),
    }
}

fn write_header<W: Write>(writer: &mut W, columns: &[&str]) -> io::Result<()> {
    writeln!(
        writer,
        "#{} {} CL:{}",
        PKG_NAME,
        PKG_VERSION,
        std::env::args().collect::<Vec<_>>().join(" ")
    )?;
    writeln!(writer, "#{}", columns.join("\t"))
}

/// Per-hit report of a best-score round.
///
/// Paired reports append the opposite mate's window start, score and end
/// point, plus the second-best end point when `report_second` is set.
pub fn write_hit_report<W: Write>(
    writer: &mut W,
    names: &[String],
    reference: &Reference,
    hits: &[HitRecord],
    paired: bool,
    report_second: bool,
) -> io::Result<()> {
    let mut columns = vec!["read", "mate", "strand", "contig", "pos", "score", "sink"];
    if paired {
        columns.extend(["mate_window", "mate_score", "mate_sink"]);
        if report_second {
            columns.extend(["mate_score2", "mate_sink2"]);
        }
    }
    write_header(writer, &columns)?;

    for hit in hits {
        let name = names.get(hit.read_id as usize).map(String::as_str).unwrap_or("*");
        let (contig, pos) = reference.locate(hit.loc).unwrap_or(("*", hit.loc));
        write!(
            writer,
            "{}\t{}\t{}\t{}\t{}\t{}\t{}",
            name,
            hit.mate + 1,
            strand(hit.rc),
            contig,
            pos,
            score_field(hit.score),
            if hit.is_scored() {
                local_field(reference, hit.sink)
            } else {
                "*".to_string()
            }
        )?;
        if paired {
            let opposite_scored = hit.opposite_score != WORST_SCORE;
            write!(
                writer,
                "\t{}\t{}\t{}",
                if hit.is_scored() {
                    local_field(reference, hit.opposite_loc)
                } else {
                    "*".to_string()
                },
                score_field(hit.opposite_score),
                if opposite_scored {
                    local_field(reference, hit.opposite_sink)
                } else {
                    "*".to_string()
                }
            )?;
            if report_second {
                write!(
                    writer,
                    "\t{}\t{}",
                    score_field(hit.opposite_score2),
                    if hit.opposite_score2 != WORST_SCORE {
                        local_field(reference, hit.opposite_sink2)
                    } else {
                        "*".to_string()
                    }
                )?;
            }
        }
        writeln!(writer)?;
    }
    Ok(())
}

/// Report of an exhaustive round: surviving ring entries, oldest first
pub fn write_all_report<W: Write>(
    writer: &mut W,
    names: &[String],
    reference: &Reference,
    entries: &[(u32, Alignment)],
) -> io::Result<()> {
    write_header(writer, &["read", "strand", "contig", "pos", "score"])?;
    for (read_id, aln) in entries {
        let name = names.get(*read_id as usize).map(String::as_str).unwrap_or("*");
        let (contig, pos) = reference.locate(aln.pos).unwrap_or(("*", aln.pos));
        writeln!(
            writer,
            "{}\t{}\t{}\t{}\t{}",
            name,
            strand(aln.rc),
            contig,
            pos,
            aln.score
        )?;
    }
    Ok(())
}

pub fn main_score(
    reference_path: &Path,
    hits_path: &Path,
    read_files: &[PathBuf],
    output: Option<&Path>,
    opt: &ScoreOpt,
) -> Result<()> {
    let paired = read_files.len() == 2;
    if paired && opt.round_mode == RoundMode::All {
        bail!("--mode all scores single-end reads only");
    }
    if read_files.is_empty() {
        bail!("No read files specified");
    }

    let start = Instant::now();
    let reference = load_reference(&reference_path.to_string_lossy())
        .with_context(|| format!("Error loading reference {}", reference_path.display()))?;
    if reference.is_empty() {
        bail!("Reference {} holds no bases", reference_path.display());
    }
    log::info!(
        "Loaded reference: {} contigs, {} bases",
        reference.names.len(),
        reference.len()
    );

    let batch1 = read_fastq(&read_files[0])?;
    let batch2 = if paired {
        let batch = read_fastq(&read_files[1])?;
        if batch.len() != batch1.len() {
            bail!(
                "Mate files hold different read counts: {} vs {}",
                batch1.len(),
                batch.len()
            );
        }
        Some(batch)
    } else {
        None
    };
    log::info!("Loaded {} {}", batch1.len(), if paired { "read pairs" } else { "reads" });

    let entries = load_hits(&hits_path.to_string_lossy())
        .with_context(|| format!("Error loading hit table {}", hits_path.display()))?;

    let anchor = if paired { opt.anchor } else { 0 };
    let mut hits = build_hit_arena(&entries, &reference, batch1.len(), anchor);
    let idx_queue: Vec<u32> = (0..hits.len() as u32).collect();
    log::info!("Scoring {} hits", hits.len());

    let scheme = opt.scheme();
    let executor = ScalarBatchExecutor;
    let mut scratch = DpScratch::with_capacity(opt.dp_scratch_cells);

    let mut writer: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path).with_context(|| format!("Error creating output file {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout())),
    };

    match (opt.round_mode, batch2) {
        (RoundMode::All, _) => {
            let reads = read_set(&batch1);
            let best = BestAlignmentTable::new(reads.len());
            let state = PipelineState {
                reads: &reads,
                genome: &reference.seq,
                idx_queue: &idx_queue,
                best: &best,
                scheme: &scheme,
                score_limit: opt.score_limit,
            };
            let ring = AlignmentRing::new(opt.ring_capacity);
            let count = run_all_round(&executor, opt.band_len, state, &mut hits, &ring, 0, &mut scratch);
            log::info!("Accepted {} alignments", count);
            write_all_report(&mut writer, &batch1.names, &reference, &ring.latest(count, 0))
                .context("Error writing report")?;
        }
        (RoundMode::Best, None) => {
            let reads = read_set(&batch1);
            let best = BestAlignmentTable::new(reads.len());
            let state = PipelineState {
                reads: &reads,
                genome: &reference.seq,
                idx_queue: &idx_queue,
                best: &best,
                scheme: &scheme,
                score_limit: opt.score_limit,
            };
            let summary = run_single_end_round(&executor, opt.band_len, state, &mut hits, &mut scratch);
            let masked = mask_below_min_score(&mut hits, &reads, &scheme);
            log::debug!("{} hits scored below --score-min", masked);
            log::info!(
                "Scored {} of {} hits above the minimum score",
                summary.scored - masked,
                summary.stats.offered
            );
            write_hit_report(&mut writer, &batch1.names, &reference, &hits, false, false)
                .context("Error writing report")?;
        }
        (RoundMode::Best, Some(batch2)) => {
            let (anchor_batch, opposite_batch) = if anchor == 0 {
                (&batch1, &batch2)
            } else {
                (&batch2, &batch1)
            };
            let reads = read_set(anchor_batch);
            let reads_o = read_set(opposite_batch);
            let best = BestAlignmentTable::new(reads.len());
            let best_o = BestAlignmentTable::new(reads_o.len());
            let state = PairedState {
                base: PipelineState {
                    reads: &reads,
                    genome: &reference.seq,
                    idx_queue: &idx_queue,
                    best: &best,
                    scheme: &scheme,
                    score_limit: opt.score_limit,
                },
                reads_o: &reads_o,
                best_o: &best_o,
                pairing: opt.pairing_params(),
                options: opt.threshold_options(),
            };
            let summary = run_paired_round(&executor, opt.band_len, state, &mut hits, &mut scratch);
            log::info!(
                "Scored {} anchors and {} pairs from {} hits",
                summary.anchors_scored,
                summary.pairs_scored,
                summary.anchor.offered
            );
            write_hit_report(
                &mut writer,
                &anchor_batch.names,
                &reference,
                &hits,
                true,
                opt.report_second,
            )
            .context("Error writing report")?;
        }
    }

    writer.flush().context("Error flushing output")?;
    log::info!("Processed {} hits in {:.2} sec", hits.len(), start.elapsed().as_secs_f64());
    Ok(())
}
