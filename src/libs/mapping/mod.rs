//! Reading per-site mapping files and folding them into run tables.

pub mod reader;
pub mod run;

pub use reader::{
    load_outgroup, open_site, outgroup_from_file, read_samples, site_path, SampleReader,
};
pub use run::{run_single, run_triplet, Run, RunConfig};
