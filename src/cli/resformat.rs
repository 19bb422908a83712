use std::io::{self, Write};
use std::path::Path;

use serde::Serialize;

use crate::core::error::Result;
use crate::core::stats::{StatRecord, StatType};

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunSummary {
    pub stat: StatType,
    pub rows: u64,
    pub truncated: u64,
    // False when the consumer stopped reading early
    pub complete: bool,
}

// Keeps the kind of IO errors (broken pipe in particular) intact
fn ioerror(error: csv::Error) -> io::Error {
    match error.into_kind() {
        csv::ErrorKind::Io(x) => x,
        other => io::Error::new(io::ErrorKind::Other, format!("{:?}", other)),
    }
}

pub fn writer<W: Write>(saveto: W, delimiter: u8) -> csv::Writer<W> {
    csv::WriterBuilder::new().delimiter(delimiter).from_writer(saveto)
}

pub fn header<W: Write>(saveto: &mut csv::Writer<W>, schema: &[String]) -> Result<()> {
    saveto.write_record(schema).map_err(ioerror)?;
    Ok(())
}

pub fn row<W: Write>(saveto: &mut csv::Writer<W>, record: &StatRecord) -> Result<()> {
    saveto.write_record(record.values.iter().map(|x| x.to_string())).map_err(ioerror)?;
    Ok(())
}

pub fn summary(path: &Path, summary: &RunSummary) -> Result<()> {
    let mut saveto = csv::WriterBuilder::new().delimiter(b'\t').from_path(path).map_err(ioerror)?;
    saveto.serialize(summary).map_err(ioerror)?;
    saveto.flush()?;
    Ok(())
}
