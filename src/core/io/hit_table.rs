// Seed-hit table reader
//
// One candidate placement per line, tab separated:
//
//   read_index  strand(+|-)  contig  position(0-based)
//
// `read_index` is the zero-based record index in the read FASTQ. Blank lines
// and lines starting with '#' are ignored. Lines are kept in file order,
// which becomes the hit-queue order of the scoring round.

use std::io::{self, BufRead, BufReader};

use super::open_maybe_gz;

/// One row of the hit table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HitEntry {
    pub read_index: u32,
    /// Read aligns as its reverse complement
    pub rc: bool,
    pub contig: String,
    pub pos: u32,
}

fn invalid(line_no: usize, msg: String) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, format!("hit table line {}: {}", line_no, msg))
}

/// Parse one non-comment line
pub fn parse_hit_line(line: &str, line_no: usize) -> io::Result<HitEntry> {
    let fields: Vec<&str> = line.split('\t').map(|f| f.trim()).collect();
    if fields.len() < 4 {
        return Err(invalid(line_no, format!("expected 4 fields, found {}", fields.len())));
    }

    let read_index = fields[0]
        .parse::<u32>()
        .map_err(|_| invalid(line_no, format!("invalid read index '{}'", fields[0])))?;
    let rc = match fields[1] {
        "+" => false,
        "-" => true,
        other => return Err(invalid(line_no, format!("strand must be '+' or '-', got '{}'", other))),
    };
    let pos = fields[3]
        .parse::<u32>()
        .map_err(|_| invalid(line_no, format!("invalid position '{}'", fields[3])))?;

    Ok(HitEntry {
        read_index,
        rc,
        contig: fields[2].to_string(),
        pos,
    })
}

/// Read every hit from `reader`
pub fn read_hits<R: BufRead>(reader: R) -> io::Result<Vec<HitEntry>> {
    let mut hits = Vec::new();
    for (k, line) in reader.lines().enumerate() {
        let line = line?;
        let trimmed = line.trim_end();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        hits.push(parse_hit_line(trimmed, k + 1)?);
    }
    Ok(hits)
}

/// Load a hit table file (optionally gzip compressed)
pub fn load_hits(path: &str) -> io::Result<Vec<HitEntry>> {
    let hits = read_hits(BufReader::new(open_maybe_gz(path)?))?;
    log::debug!("Loaded {} hits from {}", hits.len(), path);
    Ok(hits)
}
