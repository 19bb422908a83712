use bio_types::genome;
use bio_types::strand::ReqStrand;
#[cfg(test)]
use mockall::{mock, predicate::*};
use rust_htslib::bam::record::{Cigar, CigarString, CigarStringView};
use rust_htslib::bam::Record;

// SAM flags used across the crate
pub mod flags {
    pub const PAIRED: u16 = 0x1;
    pub const PROPER_PAIR: u16 = 0x2;
    pub const UNMAPPED: u16 = 0x4;
    pub const MATE_UNMAPPED: u16 = 0x8;
    pub const REVERSE: u16 = 0x10;
    pub const MATE_REVERSE: u16 = 0x20;
    pub const SECONDARY: u16 = 0x100;
    pub const QCFAIL: u16 = 0x200;
    pub const DUPLICATE: u16 = 0x400;
}

#[allow(clippy::len_without_is_empty)]
pub trait SequencedRead {
    fn strand(&self) -> &ReqStrand;

    /// Empty when the sequence isn't stored (SEQ '*'), even for aligned reads.
    fn seq(&self) -> Vec<u8>;

    fn qual(&self) -> &[u8];
    /// Missing qualities are reported as 0.
    fn base_qual(&self, i: usize) -> u8 {
        self.qual().get(i).copied().unwrap_or(0)
    }

    fn len(&self) -> usize;
}

pub trait AlignedRead: SequencedRead {
    fn cigar(&self) -> CigarStringView;
    fn mapq(&self) -> u8;
    fn pos(&self) -> i64;
    fn contig(&self) -> &str;
    fn flags(&self) -> u16;
    // Reference id of the read and of its mate (-1 when unknown)
    fn tid(&self) -> i32;
    fn mtid(&self) -> i32;
    fn tlen(&self) -> i64;
}

#[cfg(test)]
mock! {
    pub Read {}
    impl AlignedRead for Read {
        fn cigar(&self) -> CigarStringView;
        fn mapq(&self) -> u8;
        fn pos(&self) -> i64;
        fn contig(&self) -> &str;
        fn flags(&self) -> u16;
        fn tid(&self) -> i32;
        fn mtid(&self) -> i32;
        fn tlen(&self) -> i64;
    }

    impl SequencedRead for Read {
        fn strand(&self) -> &ReqStrand;

        fn seq(&self) -> Vec<u8>;

        fn qual(&self) -> &[u8];
        fn base_qual(&self, i: usize) -> u8;

        fn len(&self) -> usize;
    }
}

impl SequencedRead for Record {
    #[inline]
    fn strand(&self) -> &ReqStrand {
        if self.is_reverse() {
            &ReqStrand::Reverse
        } else {
            &ReqStrand::Forward
        }
    }

    #[inline]
    fn seq(&self) -> Vec<u8> {
        self.seq().as_bytes()
    }

    #[inline]
    fn qual(&self) -> &[u8] {
        self.qual()
    }

    #[inline]
    fn len(&self) -> usize {
        self.seq_len()
    }
}

impl AlignedRead for Record {
    #[inline]
    fn cigar(&self) -> CigarStringView {
        self.cigar()
    }

    #[inline]
    fn mapq(&self) -> u8 {
        self.mapq()
    }

    #[inline]
    fn pos(&self) -> i64 {
        self.pos()
    }

    #[inline]
    fn contig(&self) -> &str {
        genome::AbstractInterval::contig(self)
    }

    #[inline]
    fn flags(&self) -> u16 {
        self.flags()
    }

    #[inline]
    fn tid(&self) -> i32 {
        self.tid()
    }

    #[inline]
    fn mtid(&self) -> i32 {
        self.mtid()
    }

    #[inline]
    fn tlen(&self) -> i64 {
        self.insert_size()
    }
}

/// Alignment record that owns all of its data. Used by the in-memory alignment source.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedRead {
    contig: String,
    tid: i32,
    pos: i64,
    cigar: CigarString,
    seq: Vec<u8>,
    qual: Vec<u8>,
    mapq: u8,
    flags: u16,
    mtid: i32,
    tlen: i64,
}

impl OwnedRead {
    /// Unpaired forward read with mapq 60 and base qualities 30.
    pub fn new(contig: &str, pos: i64, cigar: Vec<Cigar>, seq: &[u8]) -> Self {
        Self {
            contig: contig.to_owned(),
            tid: 0,
            pos,
            cigar: CigarString(cigar),
            seq: seq.to_vec(),
            qual: vec![30; seq.len()],
            mapq: 60,
            flags: 0,
            mtid: -1,
            tlen: 0,
        }
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_mapq(mut self, mapq: u8) -> Self {
        self.mapq = mapq;
        self
    }

    pub fn with_qual(mut self, qual: &[u8]) -> Self {
        debug_assert_eq!(qual.len(), self.seq.len());
        self.qual = qual.to_vec();
        self
    }

    pub fn with_tid(mut self, tid: i32) -> Self {
        self.tid = tid;
        self
    }

    pub fn with_mate(mut self, mtid: i32, tlen: i64) -> Self {
        self.mtid = mtid;
        self.tlen = tlen;
        self
    }
}

impl SequencedRead for OwnedRead {
    fn strand(&self) -> &ReqStrand {
        if self.flags & flags::REVERSE != 0 {
            &ReqStrand::Reverse
        } else {
            &ReqStrand::Forward
        }
    }

    fn seq(&self) -> Vec<u8> {
        self.seq.clone()
    }

    fn qual(&self) -> &[u8] {
        &self.qual
    }

    fn len(&self) -> usize {
        self.seq.len()
    }
}

impl AlignedRead for OwnedRead {
    fn cigar(&self) -> CigarStringView {
        self.cigar.clone().into_view(self.pos)
    }

    fn mapq(&self) -> u8 {
        self.mapq
    }

    fn pos(&self) -> i64 {
        self.pos
    }

    fn contig(&self) -> &str {
        &self.contig
    }

    fn flags(&self) -> u16 {
        self.flags
    }

    fn tid(&self) -> i32 {
        self.tid
    }

    fn mtid(&self) -> i32 {
        self.mtid
    }

    fn tlen(&self) -> i64 {
        self.tlen
    }
}

#[cfg(test)]
mod tests {
    use rust_htslib::bam::record::Cigar::*;

    use super::*;

    #[test]
    fn owned() {
        let read = OwnedRead::new("chr1", 10, vec![SoftClip(2), Match(3), Del(2), Match(1)], b"NNACGT")
            .with_flags(flags::PAIRED | flags::REVERSE)
            .with_mate(0, -120)
            .with_mapq(13);

        assert_eq!(read.strand(), &ReqStrand::Reverse);
        assert_eq!(read.cigar().end_pos(), 16);
        assert_eq!(read.seq()[2], b'A');
        assert_eq!(read.base_qual(5), 30);
        assert_eq!(read.base_qual(6), 0);
        assert_eq!((read.mapq(), read.tlen(), read.mtid(), read.len()), (13, -120, 0, 6));
    }
}
