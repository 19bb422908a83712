pub use alphabet::Nucleotide;
pub use ncounts::NucCounts;

mod alphabet;
mod ncounts;
