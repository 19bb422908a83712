use clap::Arg;

use super::validate;

pub mod core {
    use super::*;

    pub const INPUT: &str = "input";
    pub const REFERENCE: &str = "reference";
    pub const TYPE: &str = "type";
    pub const SAVETO: &str = "saveto";
    pub const FORMAT: &str = "format";
    pub const FIELDS: &str = "fields";
    pub const SUMMARY: &str = "summary";
    pub const VERBOSE: &str = "verbose";
    pub const QUIET: &str = "quiet";

    pub const SECTION_NAME: &str = "Core";

    pub fn args<'a>() -> Vec<Arg<'a>> {
        let args = vec![
            Arg::new(INPUT)
                .short('i')
                .long(INPUT)
                .required(true)
                .takes_value(true)
                .validator(validate::path)
                .long_help("Path to the indexed input BAM/CRAM file."),
            Arg::new(REFERENCE)
                .short('r')
                .long(REFERENCE)
                .takes_value(true)
                .validator(validate::path)
                .long_help("Reference genome in the FASTA format. Required by the variation, baseq_ext, coverage_gc, coverage_binned and coverage_ext_binned statistics. Faidx-indexed files are read on demand, other (including gzipped) files are loaded in memory."),
            Arg::new(TYPE)
                .short('t')
                .long(TYPE)
                .takes_value(true)
                .validator(validate::stat)
                .default_value("coverage")
                .long_help("Type of statistics to compute. Per-position: coverage, coverage_ext, variation, tlen, mapq, baseq, baseq_ext (each with a _strand variant) and coverage_gc. Per-window: coverage_binned, coverage_ext_binned, mapq_binned, alignment_binned, tlen_binned."),
            Arg::new(FIELDS)
                .short('f')
                .long(FIELDS)
                .takes_value(true)
                .long_help("Comma-separated list of fields to output, in the requested order. By default, all fields of the selected statistics type are reported."),
            Arg::new(SAVETO)
                .short('o')
                .long(SAVETO)
                .takes_value(true)
                .long_help("Path to the output file. By default, the results are printed to stdout."),
            Arg::new(FORMAT)
                .long(FORMAT)
                .takes_value(true)
                .possible_values(["tsv", "csv"])
                .default_value("tsv")
                .long_help("Output format."),
            Arg::new(SUMMARY)
                .long(SUMMARY)
                .takes_value(true)
                .long_help("Save a short run summary (statistics type, number of rows, rows affected by the depth cap) to the given TSV file."),
            Arg::new(VERBOSE)
                .short('v')
                .long(VERBOSE)
                .multiple_occurrences(true)
                .long_help("Increase logging verbosity (-v: info, -vv: debug)."),
            Arg::new(QUIET)
                .short('q')
                .long(QUIET)
                .long_help("Do not show progress bars."),
        ];
        args.into_iter().map(|x| x.help_heading(Some(SECTION_NAME))).collect()
    }
}

pub mod region {
    use super::*;

    pub const CHROM: &str = "chrom";
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const ONE_BASED: &str = "one-based";
    pub const PAD: &str = "pad";
    pub const TRUNCATE: &str = "truncate";

    pub const SECTION_NAME: &str = "Region";

    pub fn args<'a>() -> Vec<Arg<'a>> {
        let args = vec![
            Arg::new(CHROM)
                .short('c')
                .long(CHROM)
                .takes_value(true)
                .long_help("Chromosome/contig to process. By default, all contigs from the BAM header are processed."),
            Arg::new(START)
                .short('s')
                .long(START)
                .takes_value(true)
                .requires(CHROM)
                .validator(validate::numeric(0u64, u64::MAX))
                .long_help("Start position of the region (0-based by default, see --one-based)."),
            Arg::new(END)
                .short('e')
                .long(END)
                .takes_value(true)
                .requires(CHROM)
                .validator(validate::numeric(1u64, u64::MAX))
                .long_help("End position of the region (exclusive for 0-based, inclusive for 1-based coordinates)."),
            Arg::new(ONE_BASED)
                .long(ONE_BASED)
                .long_help("Coordinates are 1-based, both for the --start/--end options and for the output."),
            Arg::new(PAD)
                .long(PAD)
                .long_help("Report every position (or window) of the region, including those without reads."),
            Arg::new(TRUNCATE)
                .long(TRUNCATE)
                .long_help("Report only positions (or windows) inside the region. Otherwise, positions covered by reads overlapping the region are reported as well."),
        ];
        args.into_iter().map(|x| x.help_heading(Some(SECTION_NAME))).collect()
    }
}

pub mod pileup {
    use super::*;

    pub const MAX_DEPTH: &str = "max-depth";
    pub const WINDOW_SIZE: &str = "window-size";
    pub const WINDOW_OFFSET: &str = "window-offset";

    // Larger than any known chromosome
    pub const MAX_WINDOW: u64 = 1 << 32;

    pub const SECTION_NAME: &str = "Pileup";

    pub fn args<'a>() -> Vec<Arg<'a>> {
        let args = vec![
            Arg::new(MAX_DEPTH)
                .long(MAX_DEPTH)
                .takes_value(true)
                .validator(validate::numeric(1u32, u32::MAX))
                .default_value("8000")
                .long_help("Maximum number of reads considered per position. Positions above the cap are still reported, computed over the first reads only."),
            Arg::new(WINDOW_SIZE)
                .long(WINDOW_SIZE)
                .takes_value(true)
                .validator(validate::numeric(1u64, MAX_WINDOW))
                .default_value("300")
                .long_help("Size of the windows for binned statistics and of the GC window for coverage_gc."),
            Arg::new(WINDOW_OFFSET)
                .long(WINDOW_OFFSET)
                .takes_value(true)
                .validator(validate::numeric(0u64, MAX_WINDOW - 1))
                .default_value("150")
                .long_help("Offset of the reported position relative to the window start. Must be less than the window size."),
        ];
        args.into_iter().map(|x| x.help_heading(Some(SECTION_NAME))).collect()
    }
}

pub mod reads_filtering {
    use super::*;

    pub const MAPQ: &str = "mapq";
    pub const PHREAD: &str = "phread";
    pub const INCLUDE_FLAGS: &str = "in-flags";
    pub const EXCLUDE_FLAGS: &str = "ex-flags";

    pub const SECTION_NAME: &str = "Reads filtering";

    pub fn args<'a>() -> Vec<Arg<'a>> {
        let args = vec![
            Arg::new(MAPQ)
                .long(MAPQ)
                .takes_value(true)
                .validator(validate::numeric(0u8, 255u8))
                .default_value("0")
                .long_help("Count only reads with mapq ≥ threshold."),
            Arg::new(PHREAD)
                .long(PHREAD)
                .takes_value(true)
                .validator(validate::numeric(0u8, 255u8))
                .default_value("0")
                .long_help("Count only bases with phread ≥ threshold. Deletions are never filtered by quality."),
            Arg::new(INCLUDE_FLAGS)
                .long(INCLUDE_FLAGS)
                .takes_value(true)
                .validator(validate::numeric(0u16, 4095u16))
                .default_value("0")
                .long_help("Include only reads for which all the specified BAM flags are set. Use zero(0) to disable this filter."),
            Arg::new(EXCLUDE_FLAGS)
                .long(EXCLUDE_FLAGS)
                .takes_value(true)
                .validator(validate::numeric(0u16, 4095u16))
                .default_value(DEFAULT_EXCLUDE_FLAGS_STR)
                .long_help("Exclude reads for which any of the specified BAM flags are set. The default skips unmapped reads, secondary alignments, reads failing platform/vendor quality checks and duplicates. Use zero(0) to disable this filter."),
        ];
        args.into_iter().map(|x| x.help_heading(Some(SECTION_NAME))).collect()
    }

    const DEFAULT_EXCLUDE_FLAGS_STR: &str = "1796";

}

pub fn all<'a>() -> Vec<Arg<'a>> {
    core::args()
        .into_iter()
        .chain(region::args().into_iter())
        .chain(pileup::args().into_iter())
        .chain(reads_filtering::args().into_iter())
        .collect()
}
