use std::ops::Add;

use derive_more::{Add, AddAssign};
use itertools::izip;

use crate::core::dna::{NucCounts, Nucleotide};
use crate::core::pileup::{MateState, Observation, PileupEntry, ReadInfo};
use crate::core::strandutil::Stranded;

use super::record::{Moments, Value};

/// Per-position statistic, fed with every entry of a pileup column.
/// Accumulators are additive, which makes the strand split exact.
pub trait ColumnStat: Default + Copy + Add<Output = Self> {
    fn process(&mut self, entry: &PileupEntry, refnuc: Nucleotide);
    fn values(&self, out: &mut Vec<Value>);
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct Coverage {
    pub reads_all: u64,
    pub reads_pp: u64,
}

impl Coverage {
    #[inline]
    pub fn count(&mut self, read: &ReadInfo) {
        self.reads_all += 1;
        self.reads_pp += read.is_proper_pair() as u64;
    }
}

impl ColumnStat for Coverage {
    #[inline]
    fn process(&mut self, entry: &PileupEntry, _: Nucleotide) {
        self.count(&entry.read);
    }

    fn values(&self, out: &mut Vec<Value>) {
        out.extend([self.reads_all.into(), self.reads_pp.into()]);
    }
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct CoverageExt {
    pub coverage: Coverage,
    pub mate_unmapped: u64,
    pub mate_other_chr: u64,
    pub mate_same_strand: u64,
    pub faceaway: u64,
    pub softclipped: u64,
    pub duplicate: u64,
}

impl CoverageExt {
    pub fn count(&mut self, read: &ReadInfo) {
        self.coverage.count(read);
        match read.mate() {
            Some(MateState::Unmapped) => self.mate_unmapped += 1,
            Some(MateState::OtherContig) => self.mate_other_chr += 1,
            Some(MateState::SameStrand) => self.mate_same_strand += 1,
            Some(MateState::FaceAway) => self.faceaway += 1,
            Some(MateState::Normal) | None => {}
        }
        self.softclipped += read.softclipped as u64;
        self.duplicate += read.is_duplicate() as u64;
    }
}

impl ColumnStat for CoverageExt {
    #[inline]
    fn process(&mut self, entry: &PileupEntry, _: Nucleotide) {
        self.count(&entry.read);
    }

    fn values(&self, out: &mut Vec<Value>) {
        self.coverage.values(out);
        let mates = [self.mate_unmapped, self.mate_other_chr, self.mate_same_strand, self.faceaway];
        out.extend(mates.map(Value::from));
        out.extend([self.softclipped, self.duplicate].map(Value::from));
    }
}

/// Pair of counters for all reads and for properly paired ones only.
#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct Counter {
    pub all: u64,
    pub pp: u64,
}

impl Counter {
    #[inline]
    pub fn inc(&mut self, pp: bool) {
        self.all += 1;
        self.pp += pp as u64;
    }

    pub fn values(&self, out: &mut Vec<Value>) {
        out.extend([self.all.into(), self.pp.into()]);
    }
}

/// Samples of all reads and of properly paired ones only.
#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct Sampled {
    pub all: Moments,
    pub pp: Moments,
}

impl Sampled {
    #[inline]
    pub fn push(&mut self, x: f64, pp: bool) {
        self.all.push(x);
        if pp {
            self.pp.push(x);
        }
    }

    /// |tlen| of reads with a mapped mate, zero template lengths are unknown
    #[inline]
    pub fn sample_tlen(&mut self, read: &ReadInfo) {
        if read.has_mapped_mate() && read.tlen != 0 {
            self.push(read.tlen.unsigned_abs() as f64, read.is_proper_pair());
        }
    }
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct Variation {
    pub reads: Counter,
    pub matches: Counter,
    pub mismatches: Counter,
    pub deletions: Counter,
    pub insertions: Counter,
    pub nucs: NucCounts,
    pub nucs_pp: NucCounts,
    pub unknown: Counter,
}

impl ColumnStat for Variation {
    fn process(&mut self, entry: &PileupEntry, refnuc: Nucleotide) {
        let pp = entry.read.is_proper_pair();
        self.reads.inc(pp);
        match entry.observation {
            Observation::Deletion => self.deletions.inc(pp),
            Observation::Base { nuc, .. } => {
                if is_match(nuc, refnuc) {
                    self.matches.inc(pp);
                } else {
                    self.mismatches.inc(pp);
                }
                if nuc.is_called() {
                    self.nucs.increment(nuc);
                    if pp {
                        self.nucs_pp.increment(nuc);
                    }
                } else {
                    self.unknown.inc(pp);
                }
            }
        }
        if entry.insertion {
            self.insertions.inc(pp);
        }
    }

    fn values(&self, out: &mut Vec<Value>) {
        for counter in [&self.reads, &self.matches, &self.mismatches, &self.deletions, &self.insertions] {
            counter.values(out);
        }
        let (nucs, pp) = (&self.nucs, &self.nucs_pp);
        out.extend([nucs.A, pp.A, nucs.C, pp.C, nucs.T, pp.T, nucs.G, pp.G].map(Value::from));
        self.unknown.values(out);
    }
}

// Uncalled reference bases never match
#[inline]
fn is_match(nuc: Nucleotide, refnuc: Nucleotide) -> bool {
    refnuc.is_called() && nuc == refnuc
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct Tlen {
    pub reads_all: u64,
    pub reads_paired: u64,
    pub reads_pp: u64,
    pub tlen: Sampled,
}

impl ColumnStat for Tlen {
    fn process(&mut self, entry: &PileupEntry, _: Nucleotide) {
        let read = &entry.read;
        self.reads_all += 1;
        self.reads_pp += read.is_proper_pair() as u64;
        if read.has_mapped_mate() {
            self.reads_paired += 1;
        }
        self.tlen.sample_tlen(read);
    }

    fn values(&self, out: &mut Vec<Value>) {
        out.extend([self.reads_all.into(), self.reads_paired.into(), self.reads_pp.into()]);
        out.extend(
            [
                self.tlen.all.mean(),
                self.tlen.pp.mean(),
                self.tlen.all.rms(),
                self.tlen.pp.rms(),
                self.tlen.all.std(),
                self.tlen.pp.std(),
            ]
            .map(Value::from),
        );
    }
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct Mapq {
    pub reads: Counter,
    pub mapq0: Counter,
    pub mapq: Sampled,
}

impl ColumnStat for Mapq {
    fn process(&mut self, entry: &PileupEntry, _: Nucleotide) {
        let pp = entry.read.is_proper_pair();
        self.reads.inc(pp);
        if entry.read.mapq == 0 {
            self.mapq0.inc(pp);
        }
        self.mapq.push(entry.read.mapq as f64, pp);
    }

    fn values(&self, out: &mut Vec<Value>) {
        self.reads.values(out);
        self.mapq0.values(out);
        out.extend([self.mapq.all.rms().into(), self.mapq.pp.rms().into()]);
        out.extend([self.mapq.all.max() as u64, self.mapq.pp.max() as u64].map(Value::from));
    }
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct Baseq {
    pub reads: Counter,
    pub baseq: Sampled,
}

impl ColumnStat for Baseq {
    fn process(&mut self, entry: &PileupEntry, _: Nucleotide) {
        let pp = entry.read.is_proper_pair();
        self.reads.inc(pp);
        if let Observation::Base { qual, .. } = entry.observation {
            self.baseq.push(qual as f64, pp);
        }
    }

    fn values(&self, out: &mut Vec<Value>) {
        self.reads.values(out);
        out.extend([self.baseq.all.rms().into(), self.baseq.pp.rms().into()]);
    }
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct BaseqExt {
    pub reads: Counter,
    pub matches: Counter,
    pub mismatches: Counter,
    pub baseq: Sampled,
    pub baseq_matches: Sampled,
    pub baseq_mismatches: Sampled,
}

impl ColumnStat for BaseqExt {
    fn process(&mut self, entry: &PileupEntry, refnuc: Nucleotide) {
        let pp = entry.read.is_proper_pair();
        self.reads.inc(pp);

        let (nuc, qual) = match entry.observation {
            Observation::Base { nuc, qual } => (nuc, qual as f64),
            Observation::Deletion => return,
        };
        self.baseq.push(qual, pp);
        if is_match(nuc, refnuc) {
            self.matches.inc(pp);
            self.baseq_matches.push(qual, pp);
        } else {
            self.mismatches.inc(pp);
            self.baseq_mismatches.push(qual, pp);
        }
    }

    fn values(&self, out: &mut Vec<Value>) {
        for counter in [&self.reads, &self.matches, &self.mismatches] {
            counter.values(out);
        }
        for sampled in [&self.baseq, &self.baseq_matches, &self.baseq_mismatches] {
            out.extend([sampled.all.rms().into(), sampled.pp.rms().into()]);
        }
    }
}

impl<T: ColumnStat> ColumnStat for Stranded<T> {
    #[inline]
    fn process(&mut self, entry: &PileupEntry, refnuc: Nucleotide) {
        self[entry.read.strand].process(entry, refnuc);
    }

    fn values(&self, out: &mut Vec<Value>) {
        let (mut total, mut forward, mut reverse) = (Vec::new(), Vec::new(), Vec::new());
        self.total().values(&mut total);
        self.forward.values(&mut forward);
        self.reverse.values(&mut reverse);
        for (t, f, r) in izip!(total, forward, reverse) {
            out.extend([t, f, r]);
        }
    }
}
