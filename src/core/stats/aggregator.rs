use crate::core::dna::{NucCounts, Nucleotide};
use crate::core::error::{Error, Result};
use crate::core::io::fasta::ReferenceSource;
use crate::core::pileup::PileupColumn;
use crate::core::strandutil::Stranded;

use super::column::{Baseq, BaseqExt, ColumnStat, Coverage, CoverageExt, Mapq, Tlen, Variation};
use super::record::{StatRecord, Value};
use super::StatType;

/// Rounded percentage of G/C among the called bases, 0 if nothing is called.
pub fn gc_percent(sequence: &[Nucleotide]) -> u64 {
    let counts = NucCounts::from_sequence(sequence);
    if counts.coverage() == 0 {
        return 0;
    }
    (100.0 * counts.gc() as f64 / counts.coverage() as f64).round() as u64
}

fn tally<T: ColumnStat>(column: &PileupColumn, refnuc: Nucleotide, out: &mut Vec<Value>) {
    let mut stat = T::default();
    for entry in &column.entries {
        stat.process(entry, refnuc);
    }
    stat.values(out);
}

/// Turns pileup columns into records of a single per-position statistic type.
pub struct ColumnAggregator {
    stat: StatType,
    width: usize,
    window_size: u64,
    window_offset: u64,
}

impl ColumnAggregator {
    pub fn new(stat: StatType, window_size: u64, window_offset: u64) -> Result<Self> {
        if stat.is_binned() {
            let available = StatType::ALL.iter().filter(|x| !x.is_binned()).map(|x| x.name()).collect::<Vec<_>>();
            return Err(Error::UnsupportedStatType(stat.name().into(), available.join(", ")));
        }
        if stat.uses_window() && window_offset >= window_size {
            return Err(Error::InvalidWindow { size: window_size, offset: window_offset });
        }
        Ok(Self { stat, width: stat.schema().len(), window_size, window_offset })
    }

    pub fn aggregate<F: ReferenceSource>(
        &self,
        column: &PileupColumn,
        reference: Option<&mut F>,
    ) -> Result<StatRecord> {
        let mut values = Vec::with_capacity(self.width);
        values.push(Value::Text(column.contig.clone()));
        values.push(Value::Count(column.pos));

        let mut refnuc = Nucleotide::Unknown;
        if self.stat.needs_reference() {
            let reference = reference.ok_or_else(|| Error::MissingReference(self.stat.name().into()))?;
            refnuc = reference.fetch_base(&column.contig, column.pos)?;
            values.push(Value::Base(refnuc));
            if self.stat.reports_gc() {
                let window =
                    reference.fetch_window(&column.contig, column.pos, self.window_offset, self.window_size)?;
                values.push(Value::Count(gc_percent(window)));
            }
        }

        match self.stat {
            StatType::Coverage | StatType::CoverageGc => tally::<Coverage>(column, refnuc, &mut values),
            StatType::CoverageStrand => tally::<Stranded<Coverage>>(column, refnuc, &mut values),
            StatType::CoverageExt => tally::<CoverageExt>(column, refnuc, &mut values),
            StatType::CoverageExtStrand => tally::<Stranded<CoverageExt>>(column, refnuc, &mut values),
            StatType::Variation => tally::<Variation>(column, refnuc, &mut values),
            StatType::VariationStrand => tally::<Stranded<Variation>>(column, refnuc, &mut values),
            StatType::Tlen => tally::<Tlen>(column, refnuc, &mut values),
            StatType::TlenStrand => tally::<Stranded<Tlen>>(column, refnuc, &mut values),
            StatType::Mapq => tally::<Mapq>(column, refnuc, &mut values),
            StatType::MapqStrand => tally::<Stranded<Mapq>>(column, refnuc, &mut values),
            StatType::Baseq => tally::<Baseq>(column, refnuc, &mut values),
            StatType::BaseqStrand => tally::<Stranded<Baseq>>(column, refnuc, &mut values),
            StatType::BaseqExt => tally::<BaseqExt>(column, refnuc, &mut values),
            StatType::BaseqExtStrand => tally::<Stranded<BaseqExt>>(column, refnuc, &mut values),
            StatType::CoverageBinned
            | StatType::CoverageExtBinned
            | StatType::MapqBinned
            | StatType::AlignmentBinned
            | StatType::TlenBinned => {
                return Err(Error::UnsupportedStatType(self.stat.name().into(), "per-position types".into()))
            }
        }
        debug_assert_eq!(values.len(), self.width);
        Ok(StatRecord::new(values, column.truncated))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use bio_types::strand::ReqStrand;

    use crate::core::io::fasta::MemoryReference;
    use crate::core::pileup::{Observation, PileupEntry, ReadInfo};
    use crate::core::read::flags;

    use super::*;

    fn reference() -> MemoryReference {
        let mut reference = MemoryReference::new();
        reference.insert("chr1", b"ACGTNNGGCCAT");
        reference
    }

    fn column(pos: u64, strands: &[ReqStrand]) -> PileupColumn {
        let entries = strands
            .iter()
            .map(|strand| {
                let flags = if *strand == ReqStrand::Reverse { flags::REVERSE } else { 0 };
                let read = ReadInfo {
                    strand: *strand,
                    mapq: 60,
                    flags,
                    tlen: 0,
                    mate_other_contig: false,
                    softclipped: false,
                };
                PileupEntry { read, observation: Observation::Base { nuc: Nucleotide::G, qual: 30 }, insertion: false }
            })
            .collect();
        PileupColumn { contig: Arc::from("chr1"), pos, entries, truncated: false }
    }

    #[test]
    fn gc_percent() {
        assert_eq!(super::gc_percent(&[]), 0);
        assert_eq!(super::gc_percent(&[Nucleotide::Unknown; 3]), 0);
        assert_eq!(super::gc_percent(&[Nucleotide::G, Nucleotide::A, Nucleotide::T]), 33);
        assert_eq!(super::gc_percent(&[Nucleotide::G, Nucleotide::C, Nucleotide::T, Nucleotide::Unknown]), 67);
    }

    #[test]
    fn binned_rejected() {
        assert!(matches!(ColumnAggregator::new(StatType::MapqBinned, 300, 150), Err(Error::UnsupportedStatType(..))));
        assert!(matches!(ColumnAggregator::new(StatType::CoverageGc, 10, 10), Err(Error::InvalidWindow { .. })));
        assert!(ColumnAggregator::new(StatType::Coverage, 10, 10).is_ok());
    }

    #[test]
    fn schema_aligned() {
        let mut reference = reference();
        let column = column(2, &[ReqStrand::Forward, ReqStrand::Reverse, ReqStrand::Reverse]);
        for stat in StatType::ALL.into_iter().filter(|x| !x.is_binned()) {
            let aggregator = ColumnAggregator::new(stat, 4, 2).unwrap();
            let record = aggregator.aggregate(&column, Some(&mut reference)).unwrap();
            assert_eq!(record.values.len(), stat.schema().len(), "{}", stat);
            assert_eq!(record.values[0], Value::Text("chr1".into()));
            assert_eq!(record.values[1], Value::Count(2));
        }
    }

    #[test]
    fn missing_reference() {
        let aggregator = ColumnAggregator::new(StatType::Variation, 300, 150).unwrap();
        let result = aggregator.aggregate::<MemoryReference>(&column(0, &[]), None);
        assert!(matches!(result, Err(Error::MissingReference(_))));

        let aggregator = ColumnAggregator::new(StatType::Coverage, 300, 150).unwrap();
        assert!(aggregator.aggregate::<MemoryReference>(&column(0, &[]), None).is_ok());
    }

    #[test]
    fn coverage_gc() {
        let mut reference = reference();
        let aggregator = ColumnAggregator::new(StatType::CoverageGc, 4, 1).unwrap();
        let schema = StatType::CoverageGc.schema();

        // window [5, 9) = N G G C
        let record = aggregator.aggregate(&column(6, &[ReqStrand::Forward]), Some(&mut reference)).unwrap();
        assert_eq!(record.get(&schema, "ref"), Some(&Value::Base(Nucleotide::G)));
        assert_eq!(record.get(&schema, "gc"), Some(&Value::Count(100)));
        assert_eq!(record.get(&schema, "reads_all"), Some(&Value::Count(1)));

        // clipped to [0, 3) = A C G
        let record = aggregator.aggregate(&column(0, &[]), Some(&mut reference)).unwrap();
        assert_eq!(record.get(&schema, "gc"), Some(&Value::Count(67)));
    }

    #[test]
    fn stranded_sum() {
        let mut reference = reference();
        let column = column(3, &[ReqStrand::Forward, ReqStrand::Reverse, ReqStrand::Reverse]);
        let aggregator = ColumnAggregator::new(StatType::VariationStrand, 300, 150).unwrap();
        let schema = StatType::VariationStrand.schema();
        let record = aggregator.aggregate(&column, Some(&mut reference)).unwrap();

        for field in ["reads_all", "mismatches", "G"] {
            let total = record.get(&schema, field).and_then(|x| x.as_count()).unwrap();
            let fwd = record.get(&schema, &format!("{}_fwd", field)).and_then(|x| x.as_count()).unwrap();
            let rev = record.get(&schema, &format!("{}_rev", field)).and_then(|x| x.as_count()).unwrap();
            assert_eq!((total, fwd, rev), (3, 1, 2));
        }
    }
}
