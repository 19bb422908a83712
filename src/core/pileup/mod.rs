pub use builder::PileupBuilder;
pub use column::{Observation, PileupColumn, PileupEntry};
pub use info::{MateState, ReadInfo};

mod builder;
mod column;
mod info;
