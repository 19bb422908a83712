use bio_types::strand::ReqStrand;
use rust_htslib::bam::record::Cigar;

use crate::core::read::{flags, AlignedRead};

/// Orientation of the mate relative to a paired read. Categories are mutually exclusive.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum MateState {
    Unmapped,
    OtherContig,
    SameStrand,
    FaceAway,
    Normal,
}

/// Read-level properties shared by every position the read covers.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct ReadInfo {
    pub strand: ReqStrand,
    pub mapq: u8,
    pub flags: u16,
    pub tlen: i64,
    pub mate_other_contig: bool,
    pub softclipped: bool,
}

impl ReadInfo {
    pub fn new<R: AlignedRead>(read: &R) -> Self {
        let softclipped = read.cigar().iter().any(|x| matches!(x, Cigar::SoftClip(_)));
        Self {
            strand: *read.strand(),
            mapq: read.mapq(),
            flags: read.flags(),
            tlen: read.tlen(),
            mate_other_contig: read.tid() != read.mtid(),
            softclipped,
        }
    }

    #[inline]
    pub fn is_paired(&self) -> bool {
        self.flags & flags::PAIRED != 0
    }

    #[inline]
    pub fn is_proper_pair(&self) -> bool {
        self.flags & flags::PROPER_PAIR != 0
    }

    #[inline]
    pub fn is_duplicate(&self) -> bool {
        self.flags & flags::DUPLICATE != 0
    }

    #[inline]
    pub fn is_reverse(&self) -> bool {
        self.strand == ReqStrand::Reverse
    }

    #[inline]
    pub fn has_mapped_mate(&self) -> bool {
        self.is_paired() && self.flags & flags::MATE_UNMAPPED == 0
    }

    /// None for unpaired reads
    pub fn mate(&self) -> Option<MateState> {
        if !self.is_paired() {
            return None;
        }
        let state = if self.flags & flags::MATE_UNMAPPED != 0 {
            MateState::Unmapped
        } else if self.mate_other_contig {
            MateState::OtherContig
        } else if self.is_reverse() == (self.flags & flags::MATE_REVERSE != 0) {
            MateState::SameStrand
        } else if (self.is_reverse() && self.tlen > 0) || (!self.is_reverse() && self.tlen < 0) {
            MateState::FaceAway
        } else {
            MateState::Normal
        };
        Some(state)
    }
}
