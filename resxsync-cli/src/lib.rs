//! CLI library for testing purposes

pub mod inspect;
pub mod options;
pub mod sync;
pub mod validation;

pub use options::{SourceArgs, parse_delimiter};
