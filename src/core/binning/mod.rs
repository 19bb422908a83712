pub use binner::{BinnedWindow, Geometry, WindowBinner};
pub use stat::{AlignmentBinned, BinnedStat, MapqBinned, TlenBinned};

use crate::core::error::{Error, Result};
use crate::core::io::fasta::ReferenceSource;
use crate::core::stats::{gc_percent, StatRecord, StatType, Value};

mod binner;
mod stat;

/// Prepends window coordinates (and GC content, when the type reports it) to the window values.
pub fn finalize<F: ReferenceSource>(
    stat: StatType,
    window: BinnedWindow,
    reference: Option<&mut F>,
) -> Result<StatRecord> {
    let mut values = Vec::with_capacity(window.values.len() + 5);
    values.extend([
        Value::Text(window.contig.clone()),
        Value::Count(window.range.start),
        Value::Count(window.range.end),
        Value::Count(window.pos),
    ]);
    if stat.reports_gc() {
        let reference = reference.ok_or_else(|| Error::MissingReference(stat.name().into()))?;
        let sequence = reference.fetch(&window.contig, window.range.clone())?;
        values.push(Value::Count(gc_percent(sequence)));
    }
    values.extend(window.values);
    Ok(StatRecord::new(values, false))
}
