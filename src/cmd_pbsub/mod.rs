//! Subcommand modules for the `pbsub` binary.

pub mod path;
pub mod single;
pub mod triplet;
pub mod utils;
