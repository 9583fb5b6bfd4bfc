// FASTQ reader module using bio::io::fastq
//
// Thin wrapper around bio::io::fastq with:
// - gzip detection by file extension
// - batch reading, so large inputs can be scored round by round

use bio::io::fastq;
use std::io::{self, BufReader, Read};

use super::open_maybe_gz;

/// Batch of FASTQ reads
#[derive(Debug, Clone, Default)]
pub struct ReadBatch {
    pub names: Vec<String>,
    /// ASCII bases as read from the file
    pub seqs: Vec<Vec<u8>>,
}

impl ReadBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of reads in this batch
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// FASTQ reader with gzip detection by file extension
pub struct FastqReader {
    records: fastq::Records<BufReader<Box<dyn Read + Send>>>,
}

impl FastqReader {
    /// Open a FASTQ file (.fq, .fastq, .fq.gz, .fastq.gz)
    pub fn new(path: &str) -> io::Result<Self> {
        let reader = open_maybe_gz(path)?;
        Ok(Self {
            records: fastq::Reader::new(reader).records(),
        })
    }

    /// Read up to `batch_size` reads. Returns an empty batch at EOF.
    pub fn read_batch(&mut self, batch_size: usize) -> io::Result<ReadBatch> {
        let mut batch = ReadBatch::new();

        for _ in 0..batch_size {
            match self.records.next() {
                Some(Ok(record)) => {
                    batch.names.push(record.id().to_string());
                    batch.seqs.push(record.seq().to_vec());
                }
                Some(Err(e)) => {
                    return Err(io::Error::other(e));
                }
                None => break,
            }
        }

        Ok(batch)
    }

    /// Read every remaining record
    pub fn read_all(&mut self) -> io::Result<ReadBatch> {
        self.read_batch(usize::MAX)
    }
}
