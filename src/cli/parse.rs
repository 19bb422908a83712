use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ArgMatches;
use indicatif::ProgressBar;
use itertools::Itertools;

use crate::core::error::Result;
use crate::core::io::fasta::{IndexedFasta, MemoryReference};
use crate::core::io::hts::HTSSource;
use crate::core::stats::StatType;
use crate::core::Config;

use super::args;

const VALIDATED: &str = "Arguments must be validated by clap before parsing";

fn value<T: FromStr>(matches: &ArgMatches, key: &str) -> T {
    matches.value_of(key).and_then(|x| x.parse().ok()).expect(VALIDATED)
}

fn optional<T: FromStr>(matches: &ArgMatches, key: &str) -> Option<T> {
    matches.value_of(key).and_then(|x| x.parse().ok())
}

pub fn stat(pbar: ProgressBar, matches: &ArgMatches) -> Config {
    pbar.set_message("Parsing statistics type...");
    let stat: StatType = value(matches, args::core::TYPE);
    let mut config = Config::new(stat);
    if let Some(fields) = matches.value_of(args::core::FIELDS) {
        let fields = fields.split(',').map(|x| x.trim().to_owned()).filter(|x| !x.is_empty()).collect_vec();
        pbar.finish_with_message(format!("Statistics: {}, reported fields: {}", stat, fields.join(", ")));
        config = config.with_fields(fields);
    } else {
        pbar.finish_with_message(format!("Statistics: {}, reporting all fields", stat));
    }
    config
}

pub fn region(pbar: ProgressBar, matches: &ArgMatches, config: Config) -> Config {
    pbar.set_message("Parsing region options...");
    let one_based = matches.is_present(args::region::ONE_BASED);
    let (pad, truncate) = (matches.is_present(args::region::PAD), matches.is_present(args::region::TRUNCATE));
    let config = config.with_one_based(one_based).with_pad(pad).with_truncate(truncate);

    let contig = match matches.value_of(args::region::CHROM) {
        None => {
            pbar.finish_with_message("Processing all contigs from the alignments header");
            return config;
        }
        Some(x) => x,
    };
    // Closed 1-based [s, e] is the same interval as half-open 0-based [s - 1, e)
    let start: Option<u64> = optional(matches, args::region::START);
    let start = if one_based { start.map(|x| x.saturating_sub(1)) } else { start };
    let end: Option<u64> = optional(matches, args::region::END);

    let fmt = |x: Option<u64>| x.map(|x| x.to_string()).unwrap_or_else(|| "*".into());
    pbar.finish_with_message(format!(
        "Region: {}:{}-{} (0-based, half-open), pad: {}, truncate: {}",
        contig,
        fmt(start),
        fmt(end),
        pad,
        truncate
    ));
    config.with_region(contig, start, end)
}

pub fn pileup(pbar: ProgressBar, matches: &ArgMatches, config: Config) -> Config {
    pbar.set_message("Parsing pileup options...");
    let maxdepth = value(matches, args::pileup::MAX_DEPTH);
    let (size, offset) = (value(matches, args::pileup::WINDOW_SIZE), value(matches, args::pileup::WINDOW_OFFSET));
    let config = config.with_max_depth(maxdepth).with_window(size, offset);
    if config.stat().uses_window() {
        pbar.finish_with_message(format!("Max depth: {}, window size: {}, window offset: {}", maxdepth, size, offset));
    } else {
        pbar.finish_with_message(format!("Max depth: {}", maxdepth));
    }
    config
}

pub fn readfilter(pbar: ProgressBar, matches: &ArgMatches, config: Config) -> Config {
    pbar.set_message("Parsing reads filter options...");
    let (mapq, phread): (u8, u8) =
        (value(matches, args::reads_filtering::MAPQ), value(matches, args::reads_filtering::PHREAD));
    let (include, exclude): (u16, u16) = (
        value(matches, args::reads_filtering::INCLUDE_FLAGS),
        value(matches, args::reads_filtering::EXCLUDE_FLAGS),
    );
    pbar.finish_with_message(format!(
        "Reads filter options: require flags {}, disallow flags {}, mapq >= {}, phread >= {}.",
        include, exclude, mapq, phread
    ));
    config.with_quality(mapq, phread).with_flags(include, exclude)
}

pub fn config(factory: impl Fn() -> ProgressBar, matches: &ArgMatches) -> Config {
    let config = stat(factory(), matches);
    let config = region(factory(), matches, config);
    let config = pileup(factory(), matches, config);
    readfilter(factory(), matches, config)
}

pub fn source(pbar: ProgressBar, matches: &ArgMatches) -> Result<HTSSource> {
    pbar.set_message("Opening the alignments...");
    let path: PathBuf = value(matches, args::core::INPUT);
    let result = HTSSource::new(&path)?;
    pbar.finish_with_message(format!("Input file path: {}", path.display()));
    Ok(result)
}

/// Reference genome, read on demand when faidx-indexed and loaded in memory otherwise.
pub enum Reference {
    Indexed(IndexedFasta),
    Memory(MemoryReference),
}

fn is_indexed(path: &Path) -> bool {
    let gzipped = path.extension().map_or(false, |x| x == "gz");
    let mut fai = path.as_os_str().to_owned();
    fai.push(".fai");
    !gzipped && Path::new(&fai).exists()
}

pub fn reference(pbar: ProgressBar, matches: &ArgMatches) -> Result<Option<Reference>> {
    pbar.set_message("Parsing path to the reference assembly...");
    let path: PathBuf = match matches.value_of(args::core::REFERENCE) {
        None => {
            pbar.finish_with_message("Reference assembly is not provided");
            return Ok(None);
        }
        Some(x) => x.into(),
    };

    let result = if is_indexed(&path) {
        pbar.finish_with_message(format!("Indexed reference assembly: {}", path.display()));
        Reference::Indexed(IndexedFasta::new(&path)?)
    } else {
        pbar.set_message(format!("Loading reference assembly {} in memory...", path.display()));
        let result = MemoryReference::from_path(&path)?;
        pbar.finish_with_message(format!("Reference assembly loaded in memory: {}", path.display()));
        Reference::Memory(result)
    };
    Ok(Some(result))
}

pub fn saveto(pbar: ProgressBar, matches: &ArgMatches) -> Result<Box<dyn Write>> {
    pbar.set_message("Parsing output path...");
    let result: Box<dyn Write> = match matches.value_of(args::core::SAVETO) {
        Some(path) => {
            let file = BufWriter::new(File::create(path)?);
            pbar.finish_with_message(format!("Result will be saved to {}", path));
            Box::new(file)
        }
        None => {
            pbar.finish_with_message("Result will be printed to stdout");
            Box::new(BufWriter::new(io::stdout()))
        }
    };
    Ok(result)
}

pub fn delimiter(matches: &ArgMatches) -> u8 {
    match matches.value_of(args::core::FORMAT) {
        Some("csv") => b',',
        _ => b'\t',
    }
}

pub fn summary(matches: &ArgMatches) -> Option<PathBuf> {
    matches.value_of(args::core::SUMMARY).map(PathBuf::from)
}
