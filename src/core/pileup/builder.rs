use std::collections::VecDeque;
use std::marker::PhantomData;
use std::ops::Range;
use std::sync::Arc;

use bio_types::genome::Position;
use rust_htslib::bam::record::Cigar;

use crate::core::dna::Nucleotide;
use crate::core::error::{Error, Result};
use crate::core::filters::ReadsFilter;
use crate::core::read::AlignedRead;

use super::{Observation, PileupColumn, PileupEntry, ReadInfo};

#[derive(Default)]
struct OpenColumn {
    entries: Vec<PileupEntry>,
    truncated: bool,
}

enum Pending {
    Column(PileupColumn),
    // Uncovered positions that must be emitted as empty columns
    Padding(Range<Position>),
}

/// Turns a position-sorted stream of reads into a position-sorted stream of pileup columns.
///
/// Only columns that might still receive reads are kept open: a read starting at `s` closes every
/// column before `s`, since no later read can reach them.
pub struct PileupBuilder<R, Reads, Filter>
where
    R: AlignedRead,
    Reads: Iterator<Item = Result<R>>,
    Filter: ReadsFilter<R>,
{
    reads: Reads,
    filter: Filter,
    contig: Arc<str>,
    region: Range<Position>,
    maxdepth: usize,
    pad: bool,
    truncate: bool,
    // open[i] is the column at head + i
    open: VecDeque<OpenColumn>,
    head: Position,
    ready: VecDeque<Pending>,
    // First position that wasn't emitted (padding only)
    cursor: Position,
    laststart: i64,
    exhausted: bool,
    collided: u64,
    phantom: PhantomData<fn() -> R>,
}

impl<R, Reads, Filter> PileupBuilder<R, Reads, Filter>
where
    R: AlignedRead,
    Reads: Iterator<Item = Result<R>>,
    Filter: ReadsFilter<R>,
{
    pub fn new(
        reads: Reads,
        filter: Filter,
        contig: Arc<str>,
        region: Range<Position>,
        maxdepth: usize,
        pad: bool,
        truncate: bool,
    ) -> Self {
        debug_assert!(maxdepth > 0);
        Self {
            reads,
            filter,
            contig,
            cursor: region.start,
            region,
            maxdepth,
            pad,
            truncate,
            open: VecDeque::new(),
            head: 0,
            ready: VecDeque::new(),
            laststart: i64::MIN,
            exhausted: false,
            collided: 0,
            phantom: Default::default(),
        }
    }

    fn pad_until(&mut self, pos: Position) {
        if !self.pad {
            return;
        }
        let to = pos.min(self.region.end);
        if self.cursor < to {
            self.ready.push_back(Pending::Padding(self.cursor..to));
            self.cursor = to;
        }
    }

    // Close and emit all open columns before the limit
    fn close(&mut self, limit: Position) {
        while self.head < limit {
            let column = match self.open.pop_front() {
                Some(x) => x,
                None => break,
            };
            let pos = self.head;
            self.head += 1;

            let inside = self.region.contains(&pos);
            if self.truncate && !inside {
                continue;
            }
            if column.entries.is_empty() && !(self.pad && inside) {
                continue;
            }

            self.pad_until(pos);
            if inside {
                self.cursor = self.cursor.max(pos + 1);
            }
            self.ready.push_back(Pending::Column(PileupColumn {
                contig: self.contig.clone(),
                pos,
                entries: column.entries,
                truncated: column.truncated,
            }));
        }
    }

    fn push(&mut self, pos: i64, entry: PileupEntry) {
        if pos < 0 {
            return;
        }
        let pos = pos as Position;
        if self.truncate && !self.region.contains(&pos) {
            return;
        }
        debug_assert!(pos >= self.head);

        let idx = (pos - self.head) as usize;
        if self.open.len() <= idx {
            self.open.resize_with(idx + 1, Default::default);
        }
        let column = &mut self.open[idx];
        if column.entries.len() >= self.maxdepth {
            column.truncated = true;
        } else {
            column.entries.push(entry);
        }
    }

    fn collide(&mut self, read: &R) {
        if !self.filter.is_read_ok(read) {
            return;
        }
        self.collided += 1;

        if self.open.is_empty() {
            self.head = read.pos().max(0) as Position;
        }

        let info = ReadInfo::new(read);
        let (sequence, quality) = (read.seq(), read.qual());
        let cigar = read.cigar();
        let blocks: Vec<&Cigar> = cigar.iter().collect();

        let (mut refpos, mut seqpos) = (read.pos(), 0usize);
        for (i, block) in blocks.iter().enumerate() {
            // Carried by the anchor base, so an insertion is dropped together with a filtered anchor
            let insertion_follows = matches!(blocks.get(i + 1), Some(Cigar::Ins(_)));
            match block {
                Cigar::Match(ops) | Cigar::Equal(ops) | Cigar::Diff(ops) => {
                    let ops = *ops as usize;
                    for k in 0..ops {
                        if self.filter.is_base_ok(read, seqpos + k) {
                            let observation = Observation::Base {
                                nuc: sequence.get(seqpos + k).map_or(Nucleotide::Unknown, |x| Nucleotide::from(*x)),
                                qual: quality.get(seqpos + k).copied().unwrap_or(0),
                            };
                            let insertion = insertion_follows && k + 1 == ops;
                            self.push(refpos + k as i64, PileupEntry { read: info, observation, insertion });
                        }
                    }
                    refpos += ops as i64;
                    seqpos += ops;
                }
                Cigar::Del(ops) => {
                    for k in 0..*ops {
                        let insertion = insertion_follows && k + 1 == *ops;
                        let entry = PileupEntry { read: info, observation: Observation::Deletion, insertion };
                        self.push(refpos + k as i64, entry);
                    }
                    refpos += *ops as i64;
                }
                Cigar::RefSkip(ops) => {
                    refpos += *ops as i64;
                }
                Cigar::SoftClip(ops) | Cigar::Ins(ops) => {
                    seqpos += *ops as usize;
                }
                Cigar::HardClip(_) | Cigar::Pad(_) => {}
            }
        }
    }
}

impl<R, Reads, Filter> Iterator for PileupBuilder<R, Reads, Filter>
where
    R: AlignedRead,
    Reads: Iterator<Item = Result<R>>,
    Filter: ReadsFilter<R>,
{
    type Item = Result<PileupColumn>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.ready.pop_front() {
                Some(Pending::Column(column)) => return Some(Ok(column)),
                Some(Pending::Padding(range)) => {
                    if range.start + 1 < range.end {
                        self.ready.push_front(Pending::Padding(range.start + 1..range.end));
                    }
                    return Some(Ok(PileupColumn::empty(self.contig.clone(), range.start)));
                }
                None => {}
            }

            if self.exhausted {
                return None;
            }

            match self.reads.next() {
                None => {
                    self.exhausted = true;
                    self.close(Position::MAX);
                    self.pad_until(self.region.end);
                    log::debug!(
                        "Pileup for {}:{}-{} finished, {} reads piled up",
                        self.contig,
                        self.region.start,
                        self.region.end,
                        self.collided
                    );
                }
                Some(Err(e)) => {
                    self.exhausted = true;
                    self.open.clear();
                    return Some(Err(e));
                }
                Some(Ok(read)) => {
                    if read.pos() < self.laststart {
                        self.exhausted = true;
                        self.open.clear();
                        return Some(Err(Error::SourceRead {
                            contig: self.contig.to_string(),
                            pos: read.pos().max(0) as Position,
                            reason: "alignments are not sorted by position".into(),
                        }));
                    }
                    self.laststart = read.pos();
                    self.close(read.pos().max(0) as Position);
                    self.collide(&read);
                }
            }
        }
    }
}
