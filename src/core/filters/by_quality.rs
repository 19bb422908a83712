use derive_getters::Getters;
use derive_more::Constructor;

use super::{AlignedRead, ReadsFilter};

/// Drops reads below the mapping quality threshold and bases below the base quality threshold.
#[derive(Constructor, Getters, Copy, Clone, Debug)]
pub struct ByQuality {
    min_mapq: u8,
    min_baseq: u8,
}

impl<R: AlignedRead> ReadsFilter<R> for ByQuality {
    #[inline]
    fn is_read_ok(&self, record: &R) -> bool {
        record.mapq() >= self.min_mapq
    }

    #[inline]
    fn is_base_ok(&self, record: &R, base: usize) -> bool {
        self.min_baseq == 0 || record.base_qual(base) >= self.min_baseq
    }
}
