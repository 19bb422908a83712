use derive_getters::Getters;

use super::read::flags;
use super::stats::StatType;

/// Exclude unmapped, secondary, QC-failed and duplicate reads by default.
pub const DEFAULT_EXCLUDE_FLAGS: u16 = flags::UNMAPPED | flags::SECONDARY | flags::QCFAIL | flags::DUPLICATE;

/// Everything a pipeline run needs to know. Coordinates are 0-based, half-open.
#[derive(Clone, Debug, PartialEq, Getters)]
pub struct Config {
    stat: StatType,
    // Whole alignment file when missing
    contig: Option<String>,
    start: Option<u64>,
    end: Option<u64>,
    one_based: bool,
    pad: bool,
    truncate: bool,
    max_depth: u32,
    window_size: u64,
    window_offset: u64,
    fields: Option<Vec<String>>,
    min_mapq: u8,
    min_baseq: u8,
    include_flags: u16,
    exclude_flags: u16,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            stat: StatType::Coverage,
            contig: None,
            start: None,
            end: None,
            one_based: false,
            pad: false,
            truncate: false,
            max_depth: 8000,
            window_size: 300,
            window_offset: 150,
            fields: None,
            min_mapq: 0,
            min_baseq: 0,
            include_flags: 0,
            exclude_flags: DEFAULT_EXCLUDE_FLAGS,
        }
    }
}

impl Config {
    pub fn new(stat: StatType) -> Self {
        Self { stat, ..Default::default() }
    }

    pub fn with_region(mut self, contig: &str, start: Option<u64>, end: Option<u64>) -> Self {
        self.contig = Some(contig.to_owned());
        self.start = start;
        self.end = end;
        self
    }

    pub fn with_one_based(mut self, one_based: bool) -> Self {
        self.one_based = one_based;
        self
    }

    pub fn with_pad(mut self, pad: bool) -> Self {
        self.pad = pad;
        self
    }

    pub fn with_truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_window(mut self, size: u64, offset: u64) -> Self {
        self.window_size = size;
        self.window_offset = offset;
        self
    }

    pub fn with_fields(mut self, fields: Vec<String>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_quality(mut self, min_mapq: u8, min_baseq: u8) -> Self {
        self.min_mapq = min_mapq;
        self.min_baseq = min_baseq;
        self
    }

    pub fn with_flags(mut self, include: u16, exclude: u16) -> Self {
        self.include_flags = include;
        self.exclude_flags = exclude;
        self
    }
}
