use crate::core::error::{Error, Result};
use crate::core::stats::{StatRecord, StatType, Value};

/// Positions of the requested fields in the full schema, in the requested order.
pub fn projection(stat: StatType, fields: &[String]) -> Result<Vec<usize>> {
    let schema = stat.schema();
    fields
        .iter()
        .map(|field| {
            schema.iter().position(|x| x == field).ok_or_else(|| Error::UnknownField {
                field: field.clone(),
                stat: stat.name().into(),
                available: schema.join(", "),
            })
        })
        .collect()
}

// Indices of 0-based coordinates in the full schema; `end` is exclusive and stays as is
fn coordinates(stat: StatType) -> &'static [usize] {
    if stat.is_binned() {
        &[1, 3]
    } else {
        &[1]
    }
}

/// Shifts 0-based coordinates to the 1-based closed convention.
pub fn to_one_based(stat: StatType, values: &mut [Value]) {
    for idx in coordinates(stat) {
        if let Some(Value::Count(x)) = values.get_mut(*idx) {
            *x += 1;
        }
    }
}

/// Inverse of `to_one_based`.
pub fn to_zero_based(stat: StatType, values: &mut [Value]) {
    for idx in coordinates(stat) {
        if let Some(Value::Count(x)) = values.get_mut(*idx) {
            *x = x.saturating_sub(1);
        }
    }
}

type Progress<'a> = Box<dyn FnMut(u64) + 'a>;

/// Final stage of the pipeline: coordinate transform, field projection, depth cap warnings
/// and progress reports. Stops after the first error.
pub struct RowEmitter<'a, I: Iterator<Item = Result<StatRecord>>> {
    records: I,
    stat: StatType,
    schema: Vec<String>,
    projection: Option<Vec<usize>>,
    one_based: bool,
    progress: Option<(u64, Progress<'a>)>,
    emitted: u64,
    truncated: u64,
    failed: bool,
}

impl<'a, I: Iterator<Item = Result<StatRecord>>> RowEmitter<'a, I> {
    pub fn new(records: I, stat: StatType, fields: Option<&[String]>, one_based: bool) -> Result<Self> {
        let (schema, projection) = match fields {
            None => (stat.schema(), None),
            Some(fields) => (fields.to_vec(), Some(projection(stat, fields)?)),
        };
        Ok(Self {
            records,
            stat,
            schema,
            projection,
            one_based,
            progress: None,
            emitted: 0,
            truncated: 0,
            failed: false,
        })
    }

    /// Calls back with the number of emitted rows every `every` rows.
    pub fn with_progress(mut self, every: u64, callback: impl FnMut(u64) + 'a) -> Self {
        self.progress = Some((every.max(1), Box::new(callback)));
        self
    }

    /// Names of the emitted fields, in order.
    pub fn schema(&self) -> &[String] {
        &self.schema
    }

    pub fn emitted(&self) -> u64 {
        self.emitted
    }

    /// Number of emitted rows affected by the depth cap.
    pub fn truncated(&self) -> u64 {
        self.truncated
    }

    fn warn(&mut self, record: &StatRecord) {
        self.truncated += 1;
        let (contig, pos) = (&record.values[0], &record.values[1]);
        if self.truncated == 1 {
            log::warn!(
                "Depth cap reached at {}:{}, statistics are computed over the capped reads. Further occurrences are reported at the debug level.",
                contig,
                pos
            );
        } else {
            log::debug!("Depth cap reached at {}:{}", contig, pos);
        }
    }
}

impl<'a, I: Iterator<Item = Result<StatRecord>>> Iterator for RowEmitter<'a, I> {
    type Item = Result<StatRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let mut record = match self.records.next()? {
            Ok(x) => x,
            Err(e) => {
                self.failed = true;
                return Some(Err(e));
            }
        };

        if record.truncated {
            self.warn(&record);
        }
        if self.one_based {
            to_one_based(self.stat, &mut record.values);
        }
        if let Some(projection) = &self.projection {
            record.values = projection.iter().map(|x| record.values[*x].clone()).collect();
        }

        self.emitted += 1;
        if let Some((every, callback)) = self.progress.as_mut() {
            if self.emitted % *every == 0 {
                callback(self.emitted);
            }
        }
        Some(Ok(record))
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn record(pos: u64, reads: u64, truncated: bool) -> StatRecord {
        let values = vec![Value::Text("chr1".into()), Value::Count(pos), Value::Count(reads), Value::Count(0)];
        StatRecord::new(values, truncated)
    }

    fn records() -> Vec<Result<StatRecord>> {
        vec![Ok(record(0, 1, false)), Ok(record(1, 2, true)), Ok(record(2, 3, true))]
    }

    #[test]
    fn identity() {
        let fields = StatType::Coverage.schema();
        let projected: Vec<StatRecord> =
            RowEmitter::new(records().into_iter(), StatType::Coverage, Some(fields.as_slice()), false)
                .unwrap()
                .map(|x| x.unwrap())
                .collect();
        let plain = RowEmitter::new(records().into_iter(), StatType::Coverage, None, false).unwrap();
        let plain: Vec<StatRecord> = plain.map(|x| x.unwrap()).collect();
        assert_eq!(projected, plain);
        assert_eq!(plain, records().into_iter().map(|x| x.unwrap()).collect::<Vec<_>>());
    }

    #[test]
    fn project() {
        let fields = vec!["reads_all".to_string(), "pos".to_string()];
        let emitter =
            RowEmitter::new(records().into_iter(), StatType::Coverage, Some(fields.as_slice()), true).unwrap();
        assert_eq!(emitter.schema(), fields.as_slice());
        let rows: Vec<Vec<Value>> = emitter.map(|x| x.unwrap().values).collect();
        assert_eq!(rows[2], vec![Value::Count(3), Value::Count(3)]);
    }

    #[test]
    fn unknown_field() {
        let fields = vec!["reads_all".to_string(), "gc".to_string()];
        let result = RowEmitter::new(records().into_iter(), StatType::Coverage, Some(fields.as_slice()), false);
        assert!(matches!(result, Err(Error::UnknownField { field, .. }) if field == "gc"));
    }

    #[test]
    fn coordinates() {
        for stat in [StatType::Coverage, StatType::TlenBinned] {
            let original = vec![Value::Text("1".into()), Value::Count(0), Value::Count(300), Value::Count(150)];
            let mut values = original.clone();
            to_one_based(stat, &mut values);
            assert_ne!(values, original);
            to_zero_based(stat, &mut values);
            assert_eq!(values, original);
        }

        let mut values = vec![Value::Text("1".into()), Value::Count(0), Value::Count(300), Value::Count(150)];
        to_one_based(StatType::CoverageBinned, &mut values);
        assert_eq!(&values[1..], &[Value::Count(1), Value::Count(300), Value::Count(151)]);
    }

    #[test]
    fn counters_and_progress() {
        let calls = RefCell::new(Vec::new());
        let mut emitter = RowEmitter::new(records().into_iter(), StatType::Coverage, None, false)
            .unwrap()
            .with_progress(2, |x| calls.borrow_mut().push(x));
        assert_eq!(emitter.by_ref().count(), 3);
        assert_eq!((emitter.emitted(), emitter.truncated()), (3, 2));
        drop(emitter);
        assert_eq!(calls.into_inner(), vec![2]);
    }

    #[test]
    fn stops_on_error() {
        let records = vec![
            Ok(record(0, 1, false)),
            Err(Error::SourceRead { contig: "chr1".into(), pos: 1, reason: "broken".into() }),
            Ok(record(2, 1, false)),
        ];
        let result: Vec<Result<StatRecord>> =
            RowEmitter::new(records.into_iter(), StatType::Coverage, None, false).unwrap().collect();
        assert_eq!(result.len(), 2);
        assert!(result[1].is_err());
    }
}
