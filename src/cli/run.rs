use std::io::{ErrorKind, Write};

use clap::ArgMatches;
use indicatif::ProgressBar;

use crate::core::emitter::RowEmitter;
use crate::core::error::{Error, Result};
use crate::core::io::fasta::{IndexedFasta, ReferenceSource};
use crate::core::io::hts::AlignmentSource;
use crate::core::stats::StatRecord;
use crate::core::{Config, Pipeline};

use super::parse::{self, Reference};
use super::resformat::{self, RunSummary};
use super::style;

const PROGRESS_EVERY: u64 = 10_000;

fn is_broken_pipe(error: &Error) -> bool {
    matches!(error, Error::Io(e) if e.kind() == ErrorKind::BrokenPipe)
}

fn write<'a, I, W>(rows: &mut RowEmitter<'a, I>, saveto: &mut csv::Writer<W>) -> Result<()>
where
    I: Iterator<Item = Result<StatRecord>>,
    W: Write,
{
    resformat::header(saveto, rows.schema())?;
    for record in rows {
        resformat::row(saveto, &record?)?;
    }
    saveto.flush()?;
    Ok(())
}

/// Streams all rows into the writer. A closed output (e.g. `| head`) ends the run early without an error.
pub fn execute<S, F, W>(
    config: Config,
    source: S,
    reference: Option<F>,
    saveto: &mut csv::Writer<W>,
    pbar: ProgressBar,
) -> Result<RunSummary>
where
    S: AlignmentSource,
    F: ReferenceSource,
    W: Write,
{
    let stat = *config.stat();
    let pipeline = Pipeline::new(config, source, reference)?;

    pbar.set_style(style::run::running());
    pbar.set_message(format!("computing {} statistics", stat));
    let progress = pbar.clone();
    let mut rows = pipeline.rows()?.with_progress(PROGRESS_EVERY, move |x| progress.set_position(x));

    let complete = match write(&mut rows, saveto) {
        Ok(()) => true,
        Err(e) if is_broken_pipe(&e) => {
            log::debug!("Output stream was closed after {} rows", rows.emitted());
            false
        }
        Err(e) => {
            pbar.abandon_with_message(format!("Failed after {} rows", rows.emitted()));
            return Err(e);
        }
    };

    let summary = RunSummary { stat, rows: rows.emitted(), truncated: rows.truncated(), complete };
    pbar.set_style(style::run::finished());
    pbar.finish_with_message(format!(
        "Finished with {} rows, depth cap reached in {} of them",
        summary.rows, summary.truncated
    ));
    Ok(summary)
}

pub fn run(matches: &ArgMatches, factory: impl Fn() -> ProgressBar) -> Result<()> {
    let config = parse::config(&factory, matches);
    let source = parse::source(factory(), matches)?;
    let reference = parse::reference(factory(), matches)?;
    let mut saveto = resformat::writer(parse::saveto(factory(), matches)?, parse::delimiter(matches));

    let pbar = factory();
    let summary = match reference {
        None => execute::<_, IndexedFasta, _>(config, source, None, &mut saveto, pbar)?,
        Some(Reference::Indexed(x)) => execute(config, source, Some(x), &mut saveto, pbar)?,
        Some(Reference::Memory(x)) => execute(config, source, Some(x), &mut saveto, pbar)?,
    };

    if let Some(path) = parse::summary(matches) {
        resformat::summary(&path, &summary)?;
        log::info!("Run summary saved to {}", path.display());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io;

    use bio_types::genome::Interval;
    use rust_htslib::bam::record::Cigar::*;

    use crate::core::io::fasta::MemoryReference;
    use crate::core::io::hts::MemorySource;
    use crate::core::read::OwnedRead;
    use crate::core::stats::StatType;

    use super::*;

    fn source() -> MemorySource {
        let contigs = vec![Interval::new("chr1".into(), 0..20)];
        let reads = vec![
            OwnedRead::new("chr1", 2, vec![Match(5)], b"ACGTA"),
            OwnedRead::new("chr1", 4, vec![Match(2)], b"GT"),
        ];
        MemorySource::new(contigs, reads)
    }

    fn reference() -> MemoryReference {
        let mut reference = MemoryReference::new();
        reference.insert("chr1", b"AAACGTAAAAAAAAAAAAAA");
        reference
    }

    struct Closed(ErrorKind);

    impl Write for Closed {
        fn write(&mut self, _: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(self.0, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn coverage() {
        let mut saveto = resformat::writer(Vec::new(), b'\t');
        let config = Config::new(StatType::Coverage).with_region("chr1", Some(3), Some(6)).with_truncate(true);
        let summary =
            execute::<_, MemoryReference, _>(config, source(), None, &mut saveto, ProgressBar::hidden()).unwrap();
        assert_eq!(summary, RunSummary { stat: StatType::Coverage, rows: 3, truncated: 0, complete: true });

        let result = String::from_utf8(saveto.into_inner().unwrap()).unwrap();
        assert_eq!(result, "chrom\tpos\treads_all\treads_pp\nchr1\t3\t1\t0\nchr1\t4\t2\t0\nchr1\t5\t2\t0\n");
    }

    #[test]
    fn projected_one_based() {
        let mut saveto = resformat::writer(Vec::new(), b',');
        let config = Config::new(StatType::Variation)
            .with_region("chr1", Some(4), Some(5))
            .with_truncate(true)
            .with_one_based(true)
            .with_fields(vec!["pos".into(), "ref".into(), "matches".into()]);
        execute(config, source(), Some(reference()), &mut saveto, ProgressBar::hidden()).unwrap();

        let result = String::from_utf8(saveto.into_inner().unwrap()).unwrap();
        assert_eq!(result, "pos,ref,matches\n5,G,2\n");
    }

    #[test]
    fn broken_pipe() {
        let mut saveto = resformat::writer(Closed(ErrorKind::BrokenPipe), b'\t');
        let summary = execute::<_, MemoryReference, _>(
            Config::new(StatType::Coverage),
            source(),
            None,
            &mut saveto,
            ProgressBar::hidden(),
        )
        .unwrap();
        assert!(!summary.complete);
    }

    #[test]
    fn failures() {
        let mut saveto = resformat::writer(Closed(ErrorKind::PermissionDenied), b'\t');
        let result = execute::<_, MemoryReference, _>(
            Config::new(StatType::Coverage),
            source(),
            None,
            &mut saveto,
            ProgressBar::hidden(),
        );
        assert!(matches!(result, Err(Error::Io(_))));

        let mut saveto = resformat::writer(Vec::new(), b'\t');
        let config = Config::new(StatType::Variation);
        let result = execute::<_, MemoryReference, _>(config, source(), None, &mut saveto, ProgressBar::hidden());
        assert!(matches!(result, Err(Error::MissingReference(_))));
    }
}
