// FASTA reader module using bio::io::fasta
//
// Loads a reference into a single concatenated, numerically encoded genome
// (see core::compute::encoding). Contigs are laid out back to back; the
// contig table maps global coordinates back to (name, local offset).

use bio::io::fasta;
use std::io::{self, Read};

use super::open_maybe_gz;
use crate::core::compute::encoding::encode_into;

/// Concatenated encoded reference.
#[derive(Debug, Clone, Default)]
pub struct Reference {
    /// Encoded bases of every contig, back to back
    pub seq: Vec<u8>,
    pub names: Vec<String>,
    /// Global start of each contig, parallel to `names`
    pub starts: Vec<u32>,
}

impl Reference {
    pub fn len(&self) -> u32 {
        self.seq.len() as u32
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    /// Global coordinate of `pos` within contig `name`
    pub fn global_pos(&self, name: &str, pos: u32) -> Option<u32> {
        let k = self.names.iter().position(|n| n == name)?;
        let end = self.starts.get(k + 1).copied().unwrap_or(self.len());
        let global = self.starts[k].checked_add(pos)?;
        (global < end).then_some(global)
    }

    /// (contig name, local offset) of global coordinate `pos`
    pub fn locate(&self, pos: u32) -> Option<(&str, u32)> {
        if pos >= self.len() {
            return None;
        }
        let k = self.starts.partition_point(|&s| s <= pos).checked_sub(1)?;
        Some((self.names[k].as_str(), pos - self.starts[k]))
    }
}

/// FASTA reader with gzip detection by file extension
pub struct FastaReader {
    records: fasta::Records<std::io::BufReader<Box<dyn Read + Send>>>,
}

impl FastaReader {
    /// Open a FASTA file (.fa, .fasta, .fa.gz, .fasta.gz)
    pub fn new(path: &str) -> io::Result<Self> {
        let reader = open_maybe_gz(path)?;
        Ok(Self {
            records: fasta::Reader::new(reader).records(),
        })
    }

    /// Read the next FASTA record; `Ok(None)` at EOF
    pub fn read_record(&mut self) -> io::Result<Option<fasta::Record>> {
        match self.records.next() {
            Some(Ok(record)) => Ok(Some(record)),
            Some(Err(e)) => Err(io::Error::other(e)),
            None => Ok(None),
        }
    }

    /// Read every record into a concatenated reference
    pub fn read_reference(mut self) -> io::Result<Reference> {
        let mut reference = Reference::default();
        while let Some(record) = self.read_record()? {
            let start = reference.seq.len();
            if start + record.seq().len() > u32::MAX as usize {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "reference exceeds 2^32 bases",
                ));
            }
            reference.names.push(record.id().to_string());
            reference.starts.push(start as u32);
            encode_into(record.seq(), &mut reference.seq);
        }
        log::debug!(
            "Loaded reference: {} contigs, {} bases",
            reference.names.len(),
            reference.seq.len()
        );
        Ok(reference)
    }
}

/// Load a whole reference FASTA
pub fn load_reference(path: &str) -> io::Result<Reference> {
    FastaReader::new(path)?.read_reference()
}
