//! Statistics over the aggregated monthly values.

pub mod zscore;

pub use zscore::*;
