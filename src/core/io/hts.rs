use std::ops::Range;
use std::path::{Path, PathBuf};

use bio_types::genome::{AbstractInterval, Interval, Position};
use itertools::Itertools;
use rust_htslib::bam::{IndexedReader, Read, Record};

use crate::core::error::{Error, Result};
use crate::core::read::{AlignedRead, OwnedRead};

/// Ordered (by the alignment start) stream of reads overlapping a genomic region.
pub trait AlignmentSource {
    type Read: AlignedRead;
    type Reads: Iterator<Item = Result<Self::Read>>;

    /// Contigs in the header order with their full lengths.
    fn contigs(&self) -> Vec<Interval>;
    fn fetch(&mut self, contig: &str, range: Range<Position>) -> Result<Self::Reads>;
}

pub fn chromosomes(reader: &IndexedReader) -> Vec<Interval> {
    let header = reader.header();
    (0..header.target_count())
        .map(|tid| {
            let tname = String::from_utf8_lossy(header.tid2name(tid)).to_string();
            let tlen = header.target_len(tid).unwrap_or(0);
            Interval::new(tname, 0..tlen)
        })
        .collect()
}

/// Indexed BAM/CRAM file.
pub struct HTSSource {
    path: PathBuf,
    contigs: Vec<Interval>,
}

impl HTSSource {
    pub fn new(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let reader = IndexedReader::from_path(&path).map_err(|_| Error::MissingIndex(path.clone()))?;
        let contigs = chromosomes(&reader);
        log::debug!("Opened {} with {} contigs", path.display(), contigs.len());
        Ok(Self { path, contigs })
    }
}

impl AlignmentSource for HTSSource {
    type Read = Record;
    type Reads = HTSReads;

    fn contigs(&self) -> Vec<Interval> {
        self.contigs.clone()
    }

    fn fetch(&mut self, contig: &str, range: Range<Position>) -> Result<Self::Reads> {
        let mut reader = IndexedReader::from_path(&self.path).map_err(|_| Error::MissingIndex(self.path.clone()))?;
        reader.fetch((contig, range.start, range.end)).map_err(|e| Error::SourceRead {
            contig: contig.to_owned(),
            pos: range.start,
            reason: e.to_string(),
        })?;
        Ok(HTSReads { reader, contig: contig.to_owned(), last: range.start })
    }
}

/// Reads fetched from the indexed file. Owns its reader, so the stream is independent of the source.
pub struct HTSReads {
    reader: IndexedReader,
    contig: String,
    last: Position,
}

impl Iterator for HTSReads {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut record = Record::new();
        match self.reader.read(&mut record) {
            None => None,
            Some(Ok(())) => {
                self.last = record.pos().max(0) as Position;
                Some(Ok(record))
            }
            Some(Err(e)) => Some(Err(Error::SourceRead {
                contig: self.contig.clone(),
                pos: self.last,
                reason: e.to_string(),
            })),
        }
    }
}

/// Alignments kept in memory, sorted by contig and start.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    contigs: Vec<Interval>,
    reads: Vec<OwnedRead>,
}

impl MemorySource {
    pub fn new(contigs: Vec<Interval>, mut reads: Vec<OwnedRead>) -> Self {
        reads.sort_by_key(|x| x.pos());
        Self { contigs, reads }
    }
}

impl AlignmentSource for MemorySource {
    type Read = OwnedRead;
    type Reads = std::vec::IntoIter<Result<OwnedRead>>;

    fn contigs(&self) -> Vec<Interval> {
        self.contigs.clone()
    }

    fn fetch(&mut self, contig: &str, range: Range<Position>) -> Result<Self::Reads> {
        if !self.contigs.iter().any(|x| x.contig() == contig) {
            return Err(Error::InvalidRegion(format!("contig {} is not present in the alignments", contig)));
        }
        let (start, end) = (range.start as i64, range.end as i64);
        let reads = self
            .reads
            .iter()
            .filter(|x| x.contig() == contig && x.pos() < end && x.cigar().end_pos() > start)
            .cloned()
            .map(Ok)
            .collect_vec();
        Ok(reads.into_iter())
    }
}
