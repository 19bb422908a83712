use std::ffi::OsStr;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::bufread::MultiGzDecoder;

use crate::core::error::Result;

/// Opens a plain or gzip-compressed (by the ".gz" extension) text file.
pub fn open_compressed(path: &Path) -> Result<Box<dyn BufRead>> {
    let reader = BufReader::new(File::open(path)?);

    match path.extension().and_then(OsStr::to_str) {
        Some("gz") | Some("gzip") => Ok(Box::new(BufReader::new(MultiGzDecoder::new(reader)))),
        Some(_) | None => Ok(Box::new(reader)),
    }
}
