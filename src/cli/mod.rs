pub use run::run;

pub mod args;
pub mod parse;
pub mod resformat;
pub mod run;
pub mod style;
pub mod validate;
