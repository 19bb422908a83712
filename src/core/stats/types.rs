use std::fmt::{Display, Formatter};
use std::str::FromStr;

use itertools::Itertools;
use serde::Serialize;

use crate::core::error::Error;

/// Names of the base fields produced by each accumulator.
pub mod fields {
    pub const COVERAGE: &[&str] = &["reads_all", "reads_pp"];
    pub const COVERAGE_EXT: &[&str] = &[
        "reads_all",
        "reads_pp",
        "reads_mate_unmapped",
        "reads_mate_other_chr",
        "reads_mate_same_strand",
        "reads_faceaway",
        "reads_softclipped",
        "reads_duplicate",
    ];
    pub const VARIATION: &[&str] = &[
        "reads_all",
        "reads_pp",
        "matches",
        "matches_pp",
        "mismatches",
        "mismatches_pp",
        "deletions",
        "deletions_pp",
        "insertions",
        "insertions_pp",
        "A",
        "A_pp",
        "C",
        "C_pp",
        "T",
        "T_pp",
        "G",
        "G_pp",
        "N",
        "N_pp",
    ];
    pub const TLEN: &[&str] = &[
        "reads_all",
        "reads_paired",
        "reads_pp",
        "mean_tlen",
        "mean_tlen_pp",
        "rms_tlen",
        "rms_tlen_pp",
        "std_tlen",
        "std_tlen_pp",
    ];
    pub const MAPQ: &[&str] = &[
        "reads_all",
        "reads_pp",
        "reads_mapq0",
        "reads_mapq0_pp",
        "rms_mapq",
        "rms_mapq_pp",
        "max_mapq",
        "max_mapq_pp",
    ];
    pub const BASEQ: &[&str] = &["reads_all", "reads_pp", "rms_baseq", "rms_baseq_pp"];
    pub const BASEQ_EXT: &[&str] = &[
        "reads_all",
        "reads_pp",
        "matches",
        "matches_pp",
        "mismatches",
        "mismatches_pp",
        "rms_baseq",
        "rms_baseq_pp",
        "rms_baseq_matches",
        "rms_baseq_matches_pp",
        "rms_baseq_mismatches",
        "rms_baseq_mismatches_pp",
    ];

    pub const MAPQ_BINNED: &[&str] = &["reads_all", "reads_mapq0", "rms_mapq"];
    pub const ALIGNMENT_BINNED: &[&str] =
        &["reads_all", "bases_all", "M", "I", "D", "N", "S", "H", "P", "=", "X"];
    pub const TLEN_BINNED: &[&str] =
        &["reads_all", "reads_pp", "mean_tlen", "mean_tlen_pp", "rms_tlen", "rms_tlen_pp"];

    pub const CHROM: &str = "chrom";
    pub const POS: &str = "pos";
    pub const START: &str = "start";
    pub const END: &str = "end";
    pub const REF: &str = "ref";
    pub const GC: &str = "gc";
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatType {
    Coverage,
    CoverageStrand,
    CoverageExt,
    CoverageExtStrand,
    Variation,
    VariationStrand,
    Tlen,
    TlenStrand,
    Mapq,
    MapqStrand,
    Baseq,
    BaseqStrand,
    BaseqExt,
    BaseqExtStrand,
    CoverageGc,
    CoverageBinned,
    CoverageExtBinned,
    MapqBinned,
    AlignmentBinned,
    TlenBinned,
}

impl StatType {
    pub const ALL: [StatType; 20] = [
        StatType::Coverage,
        StatType::CoverageStrand,
        StatType::CoverageExt,
        StatType::CoverageExtStrand,
        StatType::Variation,
        StatType::VariationStrand,
        StatType::Tlen,
        StatType::TlenStrand,
        StatType::Mapq,
        StatType::MapqStrand,
        StatType::Baseq,
        StatType::BaseqStrand,
        StatType::BaseqExt,
        StatType::BaseqExtStrand,
        StatType::CoverageGc,
        StatType::CoverageBinned,
        StatType::CoverageExtBinned,
        StatType::MapqBinned,
        StatType::AlignmentBinned,
        StatType::TlenBinned,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StatType::Coverage => "coverage",
            StatType::CoverageStrand => "coverage_strand",
            StatType::CoverageExt => "coverage_ext",
            StatType::CoverageExtStrand => "coverage_ext_strand",
            StatType::Variation => "variation",
            StatType::VariationStrand => "variation_strand",
            StatType::Tlen => "tlen",
            StatType::TlenStrand => "tlen_strand",
            StatType::Mapq => "mapq",
            StatType::MapqStrand => "mapq_strand",
            StatType::Baseq => "baseq",
            StatType::BaseqStrand => "baseq_strand",
            StatType::BaseqExt => "baseq_ext",
            StatType::BaseqExtStrand => "baseq_ext_strand",
            StatType::CoverageGc => "coverage_gc",
            StatType::CoverageBinned => "coverage_binned",
            StatType::CoverageExtBinned => "coverage_ext_binned",
            StatType::MapqBinned => "mapq_binned",
            StatType::AlignmentBinned => "alignment_binned",
            StatType::TlenBinned => "tlen_binned",
        }
    }

    pub fn names() -> Vec<&'static str> {
        Self::ALL.iter().map(|x| x.name()).collect()
    }

    #[inline]
    pub fn is_binned(&self) -> bool {
        matches!(
            self,
            StatType::CoverageBinned
                | StatType::CoverageExtBinned
                | StatType::MapqBinned
                | StatType::AlignmentBinned
                | StatType::TlenBinned
        )
    }

    #[inline]
    pub fn is_stranded(&self) -> bool {
        matches!(
            self,
            StatType::CoverageStrand
                | StatType::CoverageExtStrand
                | StatType::VariationStrand
                | StatType::TlenStrand
                | StatType::MapqStrand
                | StatType::BaseqStrand
                | StatType::BaseqExtStrand
        )
    }

    /// Reference bases are compared against the observed ones (emits the `ref` column).
    #[inline]
    pub fn compares_reference(&self) -> bool {
        matches!(
            self,
            StatType::Variation
                | StatType::VariationStrand
                | StatType::BaseqExt
                | StatType::BaseqExtStrand
                | StatType::CoverageGc
        )
    }

    /// GC content of the surrounding window is reported (emits the `gc` column).
    #[inline]
    pub fn reports_gc(&self) -> bool {
        matches!(self, StatType::CoverageGc | StatType::CoverageBinned | StatType::CoverageExtBinned)
    }

    #[inline]
    pub fn needs_reference(&self) -> bool {
        self.compares_reference() || self.reports_gc()
    }

    /// Whether the window geometry is used at all.
    #[inline]
    pub fn uses_window(&self) -> bool {
        self.is_binned() || self.reports_gc()
    }

    fn base_fields(&self) -> &'static [&'static str] {
        match self {
            StatType::Coverage | StatType::CoverageStrand | StatType::CoverageGc | StatType::CoverageBinned => {
                fields::COVERAGE
            }
            StatType::CoverageExt | StatType::CoverageExtStrand | StatType::CoverageExtBinned => fields::COVERAGE_EXT,
            StatType::Variation | StatType::VariationStrand => fields::VARIATION,
            StatType::Tlen | StatType::TlenStrand => fields::TLEN,
            StatType::Mapq | StatType::MapqStrand => fields::MAPQ,
            StatType::Baseq | StatType::BaseqStrand => fields::BASEQ,
            StatType::BaseqExt | StatType::BaseqExtStrand => fields::BASEQ_EXT,
            StatType::MapqBinned => fields::MAPQ_BINNED,
            StatType::AlignmentBinned => fields::ALIGNMENT_BINNED,
            StatType::TlenBinned => fields::TLEN_BINNED,
        }
    }

    /// Number of leading coordinate fields (chrom included).
    pub fn coordinates(&self) -> usize {
        if self.is_binned() {
            4
        } else {
            2
        }
    }

    /// Ordered field names of every record of this type.
    pub fn schema(&self) -> Vec<String> {
        let mut schema: Vec<String> = if self.is_binned() {
            vec![fields::CHROM, fields::START, fields::END, fields::POS]
        } else {
            vec![fields::CHROM, fields::POS]
        }
        .into_iter()
        .map(String::from)
        .collect();

        if self.compares_reference() {
            schema.push(fields::REF.into());
        }
        if self.reports_gc() {
            schema.push(fields::GC.into());
        }

        for field in self.base_fields() {
            if self.is_stranded() {
                schema.extend([field.to_string(), format!("{}_fwd", field), format!("{}_rev", field)]);
            } else {
                schema.push(field.to_string());
            }
        }
        schema
    }
}

impl Display for StatType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for StatType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|x| x.name() == s)
            .copied()
            .ok_or_else(|| Error::UnsupportedStatType(s.to_owned(), Self::names().iter().join(", ")))
    }
}
