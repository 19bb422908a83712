use std::collections::HashMap;
use std::fs::File;
use std::io::Read;
use std::ops::Range;
use std::path::Path;

use bio::io::fasta;
use bio_types::genome::Position;

use crate::core::dna::Nucleotide;
use crate::core::error::{Error, Result};

use super::utils;

/// Reference bases for reference-dependent statistics.
/// Requested ranges are clipped to the contig end, so the returned slice might be shorter.
pub trait ReferenceSource {
    fn fetch(&mut self, contig: &str, range: Range<Position>) -> Result<&[Nucleotide]>;

    fn fetch_base(&mut self, contig: &str, pos: Position) -> Result<Nucleotide> {
        Ok(self.fetch(contig, pos..pos + 1)?.first().copied().unwrap_or_default())
    }

    /// Window [pos - offset, pos - offset + width) clipped to the contig.
    fn fetch_window(&mut self, contig: &str, pos: Position, offset: u64, width: u64) -> Result<&[Nucleotide]> {
        debug_assert!(offset < width);
        let start = pos.saturating_sub(offset);
        let end = pos.saturating_add(width - offset);
        self.fetch(contig, start..end)
    }
}

const CHUNK_SIZE: u64 = 65_536;

/// Faidx-indexed FASTA file. Sequence is fetched in chunks to avoid a disk round trip per position.
pub struct IndexedFasta {
    reader: fasta::IndexedReader<File>,
    lengths: HashMap<String, u64>,
    contig: String,
    cached: Range<Position>,
    buffer: Vec<u8>,
    cache: Vec<Nucleotide>,
}

impl IndexedFasta {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let reader = fasta::IndexedReader::from_file(&path)
            .map_err(|e| Error::Reference(format!("failed to open indexed fasta {}: {}", path.display(), e)))?;
        let lengths: HashMap<String, u64> = reader.index.sequences().into_iter().map(|x| (x.name, x.len)).collect();
        log::debug!("Indexed reference {} with {} sequences", path.display(), lengths.len());
        Ok(Self { reader, lengths, contig: String::new(), cached: 0..0, buffer: Vec::new(), cache: Vec::new() })
    }
}

impl ReferenceSource for IndexedFasta {
    fn fetch(&mut self, contig: &str, range: Range<Position>) -> Result<&[Nucleotide]> {
        let contiglen = *self
            .lengths
            .get(contig)
            .ok_or_else(|| Error::Reference(format!("contig {} is not present in the reference", contig)))?;
        let range = range.start.min(contiglen)..range.end.min(contiglen);
        if range.is_empty() {
            return Ok(&[]);
        }

        let hit = self.contig == contig && self.cached.start <= range.start && range.end <= self.cached.end;
        if !hit {
            let end = range.end.max(range.start.saturating_add(CHUNK_SIZE)).min(contiglen);
            self.reader
                .fetch(contig, range.start, end)
                .and_then(|_| self.reader.read(&mut self.buffer))
                .map_err(|e| {
                    let region = format!("{}:{}-{}", contig, range.start, end);
                    Error::Reference(format!("failed to fetch sequence for region {}: {}", region, e))
                })?;

            self.cache.clear();
            self.cache.extend(self.buffer.iter().map(|x| Nucleotide::from(*x)));
            self.contig.clear();
            self.contig.push_str(contig);
            self.cached = range.start..end;
        }

        let from = (range.start - self.cached.start) as usize;
        let to = (range.end - self.cached.start) as usize;
        Ok(&self.cache[from..to])
    }
}

/// Whole reference kept in memory. Handy for small genomes and for unindexed/gzipped FASTA files.
#[derive(Clone, Debug, Default)]
pub struct MemoryReference {
    sequences: HashMap<String, Vec<Nucleotide>>,
}

impl MemoryReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fasta(reader: impl Read) -> Result<Self> {
        let mut result = Self::new();
        for record in fasta::Reader::new(reader).records() {
            let record = record?;
            result.insert(record.id(), record.seq());
        }
        Ok(result)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let result = Self::from_fasta(utils::open_compressed(path.as_ref())?)?;
        log::debug!("Loaded {} reference sequences from {}", result.sequences.len(), path.as_ref().display());
        Ok(result)
    }

    pub fn insert(&mut self, contig: &str, sequence: &[u8]) {
        self.sequences.insert(contig.to_owned(), sequence.iter().map(|x| Nucleotide::from(*x)).collect());
    }
}

impl ReferenceSource for MemoryReference {
    fn fetch(&mut self, contig: &str, range: Range<Position>) -> Result<&[Nucleotide]> {
        let sequence = self
            .sequences
            .get(contig)
            .ok_or_else(|| Error::Reference(format!("contig {} is not present in the reference", contig)))?;
        let to = (range.end as usize).min(sequence.len());
        let from = (range.start as usize).min(to);
        Ok(&sequence[from..to])
    }
}
