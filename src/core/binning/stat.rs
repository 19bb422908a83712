use derive_more::{Add, AddAssign};
use rust_htslib::bam::record::Cigar;

use crate::core::error::{Error, Result};
use crate::core::pileup::ReadInfo;
use crate::core::read::AlignedRead;
use crate::core::stats::column::{Coverage, CoverageExt};
use crate::core::stats::{ColumnStat, Counter, Moments, Sampled, StatType, Value};

#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct MapqBinned {
    pub reads_all: u64,
    pub reads_mapq0: u64,
    pub mapq: Moments,
}

impl MapqBinned {
    fn count(&mut self, read: &ReadInfo) {
        self.reads_all += 1;
        self.reads_mapq0 += (read.mapq == 0) as u64;
        self.mapq.push(read.mapq as f64);
    }

    fn values(&self, out: &mut Vec<Value>) {
        out.extend([self.reads_all.into(), self.reads_mapq0.into(), self.mapq.rms().into()]);
    }
}

/// Total length of each CIGAR operation in the order M I D N S H P = X.
#[derive(Copy, Clone, Default, Debug, PartialEq)]
pub struct AlignmentBinned {
    pub reads_all: u64,
    pub bases_all: u64,
    pub ops: [u64; 9],
}

impl AlignmentBinned {
    fn count<R: AlignedRead>(&mut self, read: &R) {
        self.reads_all += 1;
        self.bases_all += read.len() as u64;
        for op in read.cigar().iter() {
            let (idx, len) = match op {
                Cigar::Match(x) => (0, x),
                Cigar::Ins(x) => (1, x),
                Cigar::Del(x) => (2, x),
                Cigar::RefSkip(x) => (3, x),
                Cigar::SoftClip(x) => (4, x),
                Cigar::HardClip(x) => (5, x),
                Cigar::Pad(x) => (6, x),
                Cigar::Equal(x) => (7, x),
                Cigar::Diff(x) => (8, x),
            };
            self.ops[idx] += *len as u64;
        }
    }

    fn values(&self, out: &mut Vec<Value>) {
        out.extend([self.reads_all.into(), self.bases_all.into()]);
        out.extend(self.ops.map(Value::from));
    }
}

#[derive(Copy, Clone, Default, Debug, PartialEq, Add, AddAssign)]
pub struct TlenBinned {
    pub reads: Counter,
    pub tlen: Sampled,
}

impl TlenBinned {
    fn count(&mut self, read: &ReadInfo) {
        self.reads.inc(read.is_proper_pair());
        self.tlen.sample_tlen(read);
    }

    fn values(&self, out: &mut Vec<Value>) {
        self.reads.values(out);
        let tlen = &self.tlen;
        out.extend([tlen.all.mean(), tlen.pp.mean(), tlen.all.rms(), tlen.pp.rms()].map(Value::from));
    }
}

/// Accumulator of a single window, one variant per binned statistic type.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum BinnedStat {
    Coverage(Coverage),
    CoverageExt(CoverageExt),
    Mapq(MapqBinned),
    Alignment(AlignmentBinned),
    Tlen(TlenBinned),
}

impl BinnedStat {
    pub fn new(stat: StatType) -> Result<Self> {
        let result = match stat {
            StatType::CoverageBinned => BinnedStat::Coverage(Default::default()),
            StatType::CoverageExtBinned => BinnedStat::CoverageExt(Default::default()),
            StatType::MapqBinned => BinnedStat::Mapq(Default::default()),
            StatType::AlignmentBinned => BinnedStat::Alignment(Default::default()),
            StatType::TlenBinned => BinnedStat::Tlen(Default::default()),
            _ => {
                let available = StatType::ALL.iter().filter(|x| x.is_binned()).map(|x| x.name()).collect::<Vec<_>>();
                return Err(Error::UnsupportedStatType(stat.name().into(), available.join(", ")));
            }
        };
        Ok(result)
    }

    pub fn process<R: AlignedRead>(&mut self, read: &R, info: &ReadInfo) {
        match self {
            BinnedStat::Coverage(x) => x.count(info),
            BinnedStat::CoverageExt(x) => x.count(info),
            BinnedStat::Mapq(x) => x.count(info),
            BinnedStat::Alignment(x) => x.count(read),
            BinnedStat::Tlen(x) => x.count(info),
        }
    }

    pub fn values(&self, out: &mut Vec<Value>) {
        match self {
            BinnedStat::Coverage(x) => x.values(out),
            BinnedStat::CoverageExt(x) => x.values(out),
            BinnedStat::Mapq(x) => x.values(out),
            BinnedStat::Alignment(x) => x.values(out),
            BinnedStat::Tlen(x) => x.values(out),
        }
    }
}
