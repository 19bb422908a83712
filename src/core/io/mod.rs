pub mod fasta;
pub mod hts;
pub mod utils;
