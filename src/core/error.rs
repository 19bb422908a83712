use std::path::PathBuf;

use bio_types::genome::Position;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unsupported statistic type \"{0}\". Available types: {1}")]
    UnsupportedStatType(String, String),

    #[error("Statistic type \"{0}\" requires a reference sequence, but none was provided")]
    MissingReference(String),

    #[error("Unknown field \"{field}\" for the statistic type \"{stat}\". Available fields: {available}")]
    UnknownField { field: String, stat: String, available: String },

    #[error("Invalid window: size must be > 0 and offset < size (size = {size}, offset = {offset})")]
    InvalidWindow { size: u64, offset: u64 },

    #[error("Invalid region: {0}")]
    InvalidRegion(String),

    #[error(
        "Failed to open indexed alignments {0}\n\
        Possible reasons: BAM file was not indexed (samtools index); you don't have read permissions"
    )]
    MissingIndex(PathBuf),

    #[error("Failed to read alignments for {contig}:{pos} (HTS file corrupted?): {reason}")]
    SourceRead { contig: String, pos: Position, reason: String },

    #[error("Failed to fetch reference sequence: {0}")]
    Reference(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
