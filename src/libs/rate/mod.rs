//! Rate estimation across MCMC iterations.

pub mod estimate;
pub mod report;
pub mod table;

pub use estimate::{Estimates, Variant};
pub use table::{Grid3, RunTables};
