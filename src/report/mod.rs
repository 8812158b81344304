//! Console output of parsed records.

pub mod generator;

pub use generator::*;
