//! Small numeric algorithms shared across the fresco crates

pub mod min_max_scan;
pub mod stats;

pub use min_max_scan::{MinMaxError, MinMaxScan};
pub use stats::{logspace, quantile_sorted, sorted_finite};
