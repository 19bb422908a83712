use std::sync::Arc;

use bio_types::genome::Position;

use crate::core::dna::Nucleotide;

use super::ReadInfo;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Observation {
    Base { nuc: Nucleotide, qual: u8 },
    Deletion,
}

/// A single read as seen in a pileup column.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct PileupEntry {
    pub read: ReadInfo,
    pub observation: Observation,
    // An insertion follows this position in the read
    pub insertion: bool,
}

#[derive(Clone, Eq, PartialEq, Debug)]
pub struct PileupColumn {
    pub contig: Arc<str>,
    pub pos: Position,
    pub entries: Vec<PileupEntry>,
    // Reads were dropped due to the depth cap
    pub truncated: bool,
}

impl PileupColumn {
    pub fn empty(contig: Arc<str>, pos: Position) -> Self {
        Self { contig, pos, entries: Vec::new(), truncated: false }
    }

    #[inline]
    pub fn depth(&self) -> usize {
        self.entries.len()
    }
}
