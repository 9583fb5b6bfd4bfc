//! Input loaders: reference FASTA, read FASTQ and the seed-hit table.

pub mod fasta_reader;
pub mod fastq_reader;
pub mod hit_table;

use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read};

const BUFFER_SIZE: usize = 4 * 1024 * 1024; // 4MB buffer

/// Open a possibly gzip-compressed file (detected by the .gz extension)
pub(crate) fn open_maybe_gz(path: &str) -> io::Result<Box<dyn Read + Send>> {
    let file = File::open(path)?;
    if path.ends_with(".gz") {
        log::debug!("Opening {} through gzip decompression", path);
        Ok(Box::new(BufReader::with_capacity(
            BUFFER_SIZE,
            GzDecoder::new(file),
        )))
    } else {
        Ok(Box::new(BufReader::with_capacity(BUFFER_SIZE, file)))
    }
}
