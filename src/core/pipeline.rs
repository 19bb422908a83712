use std::collections::VecDeque;
use std::ops::Range;
use std::sync::Arc;

use bio_types::genome::{AbstractInterval, Interval, Position};

use crate::core::binning::{self, Geometry, WindowBinner};
use crate::core::config::Config;
use crate::core::emitter::{self, RowEmitter};
use crate::core::error::{Error, Result};
use crate::core::filters::{ByFlags, ByQuality, Sequential};
use crate::core::io::fasta::ReferenceSource;
use crate::core::io::hts::AlignmentSource;
use crate::core::pileup::PileupBuilder;
use crate::core::read::AlignedRead;
use crate::core::stats::{ColumnAggregator, StatRecord};

/// Flags and mapping quality checks for reads, base quality checks for bases.
pub type DefaultFilter<R> = Sequential<R, ByQuality, ByFlags>;

#[derive(Clone, Debug, PartialEq)]
struct Region {
    contig: Arc<str>,
    range: Range<Position>,
    length: u64,
}

fn regions(config: &Config, contigs: &[Interval]) -> Result<Vec<Region>> {
    let name = match config.contig() {
        Some(x) => x,
        None => {
            if config.start().is_some() || config.end().is_some() {
                return Err(Error::InvalidRegion("start/end coordinates require a contig".into()));
            }
            let result = contigs
                .iter()
                .map(|x| Region { contig: x.contig().into(), range: x.range(), length: x.range().end })
                .collect();
            return Ok(result);
        }
    };

    let contig = contigs
        .iter()
        .find(|x| x.contig() == name)
        .ok_or_else(|| Error::InvalidRegion(format!("contig {} is not present in the alignments header", name)))?;
    let length = contig.range().end;
    let start = config.start().unwrap_or(0);
    let end = config.end().unwrap_or(length).min(length);
    if start >= end {
        return Err(Error::InvalidRegion(format!("{}:{}-{} is empty (contig length {})", name, start, end, length)));
    }
    Ok(vec![Region { contig: name.as_str().into(), range: start..end, length }])
}

/// Entry point of the library: validates the configuration up front and produces the rows lazily.
pub struct Pipeline<S: AlignmentSource, F: ReferenceSource> {
    config: Config,
    source: S,
    reference: Option<F>,
    regions: Vec<Region>,
}

impl<S: AlignmentSource, F: ReferenceSource> Pipeline<S, F> {
    pub fn new(config: Config, source: S, reference: Option<F>) -> Result<Self> {
        let stat = *config.stat();
        if stat.needs_reference() && reference.is_none() {
            return Err(Error::MissingReference(stat.name().into()));
        }
        if let Some(fields) = config.fields() {
            emitter::projection(stat, fields)?;
        }
        if stat.uses_window() {
            Geometry::new(*config.window_size(), *config.window_offset()).validate()?;
        }
        let regions = regions(&config, &source.contigs())?;
        log::info!("Computing {} statistics over {} region(s)", stat, regions.len());
        Ok(Self { config, source, reference, regions })
    }

    /// Names of the emitted fields, in order.
    pub fn schema(&self) -> Vec<String> {
        self.config.fields().clone().unwrap_or_else(|| self.config.stat().schema())
    }

    pub fn rows<'a>(self) -> Result<RowEmitter<'a, Records<S, F>>> {
        let (stat, fields, one_based) = (*self.config.stat(), self.config.fields().clone(), *self.config.one_based());
        let records = Records {
            source: self.source,
            reference: self.reference,
            config: self.config,
            regions: self.regions.into(),
            stage: Stage::Idle,
            failed: false,
        };
        RowEmitter::new(records, stat, fields.as_deref(), one_based)
    }
}

enum Stage<R: AlignedRead, Reads: Iterator<Item = Result<R>>> {
    Idle,
    Pileup(PileupBuilder<R, Reads, DefaultFilter<R>>, ColumnAggregator),
    Binned(WindowBinner<R, Reads, DefaultFilter<R>>),
}

/// Records of all regions in order, before projection.
pub struct Records<S: AlignmentSource, F: ReferenceSource> {
    source: S,
    reference: Option<F>,
    config: Config,
    regions: VecDeque<Region>,
    stage: Stage<S::Read, S::Reads>,
    failed: bool,
}

impl<S: AlignmentSource, F: ReferenceSource> Records<S, F> {
    fn open(&mut self, region: Region) -> Result<Stage<S::Read, S::Reads>> {
        let config = &self.config;
        log::debug!("Processing {}:{}-{}", region.contig, region.range.start, region.range.end);

        let reads = self.source.fetch(&region.contig, region.range.clone())?;
        let filter = Sequential::new(
            ByQuality::new(*config.min_mapq(), *config.min_baseq()),
            ByFlags::new(*config.include_flags(), *config.exclude_flags()),
        );

        let stage = if config.stat().is_binned() {
            let binner = WindowBinner::new(
                reads,
                filter,
                *config.stat(),
                region.contig,
                region.length,
                region.range,
                Geometry::new(*config.window_size(), *config.window_offset()),
                *config.pad(),
                *config.truncate(),
            )?;
            Stage::Binned(binner)
        } else {
            let aggregator = ColumnAggregator::new(*config.stat(), *config.window_size(), *config.window_offset())?;
            let maxdepth = (*config.max_depth()).max(1) as usize;
            let (pad, truncate) = (*config.pad(), *config.truncate());
            let builder = PileupBuilder::new(reads, filter, region.contig, region.range, maxdepth, pad, truncate);
            Stage::Pileup(builder, aggregator)
        };
        Ok(stage)
    }
}

impl<S: AlignmentSource, F: ReferenceSource> Iterator for Records<S, F> {
    type Item = Result<StatRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if self.failed {
                return None;
            }
            if matches!(self.stage, Stage::Idle) {
                let region = self.regions.pop_front()?;
                match self.open(region) {
                    Ok(stage) => self.stage = stage,
                    Err(e) => {
                        self.failed = true;
                        return Some(Err(e));
                    }
                }
            }

            let item = match &mut self.stage {
                Stage::Idle => None,
                Stage::Pileup(builder, aggregator) => builder
                    .next()
                    .map(|column| column.and_then(|column| aggregator.aggregate(&column, self.reference.as_mut()))),
                Stage::Binned(binner) => {
                    let stat = *self.config.stat();
                    let reference = &mut self.reference;
                    binner.next().map(|window| window.and_then(|x| binning::finalize(stat, x, reference.as_mut())))
                }
            };

            match item {
                None => self.stage = Stage::Idle,
                Some(Err(e)) => {
                    self.failed = true;
                    return Some(Err(e));
                }
                Some(Ok(record)) => return Some(Ok(record)),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::core::stats::StatType;

    use super::*;

    fn contigs() -> Vec<Interval> {
        vec![Interval::new("chr1".into(), 0..1000), Interval::new("chr2".into(), 0..500)]
    }

    #[test]
    fn whole_file() {
        let result = regions(&Config::default(), &contigs()).unwrap();
        let ranges: Vec<(&str, Range<Position>)> =
            result.iter().map(|x| (x.contig.as_ref(), x.range.clone())).collect();
        assert_eq!(ranges, vec![("chr1", 0..1000), ("chr2", 0..500)]);
    }

    #[test]
    fn region() {
        let config = Config::new(StatType::Coverage).with_region("chr2", Some(100), None);
        let result = regions(&config, &contigs()).unwrap();
        assert_eq!(result, vec![Region { contig: "chr2".into(), range: 100..500, length: 500 }]);

        let config = Config::new(StatType::Coverage).with_region("chr2", None, Some(10_000));
        assert_eq!(regions(&config, &contigs()).unwrap()[0].range, 0..500);
    }

    #[test]
    fn invalid_region() {
        for config in [
            Config::new(StatType::Coverage).with_region("chr3", None, None),
            Config::new(StatType::Coverage).with_region("chr1", Some(500), Some(100)),
            Config::new(StatType::Coverage).with_region("chr2", Some(600), None),
        ] {
            assert!(matches!(regions(&config, &contigs()), Err(Error::InvalidRegion(_))));
        }
    }
}
