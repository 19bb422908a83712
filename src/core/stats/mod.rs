pub use aggregator::{gc_percent, ColumnAggregator};
pub use column::{ColumnStat, Counter, Sampled};
pub use record::{Moments, StatRecord, Value};
pub use types::{fields, StatType};

mod aggregator;
pub mod column;
mod record;
mod types;
