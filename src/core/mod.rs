pub use config::Config;
pub use error::{Error, Result};
pub use pipeline::Pipeline;

pub mod binning;
pub mod config;
pub mod dna;
pub mod emitter;
pub mod error;
pub mod filters;
pub mod io;
pub mod pileup;
pub mod pipeline;
pub mod read;
pub mod stats;
pub mod strandutil;
