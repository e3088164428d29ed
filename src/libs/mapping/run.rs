use super::reader::{open_site, SampleReader};
use crate::libs::phylo::{Outgroup, Tree};
use crate::libs::rate::{Estimates, RunTables};
use crate::libs::subst::{single, triplet, Model};
use anyhow::{bail, Context};
use rayon::prelude::*;
use std::io::BufRead;

/// Resolved parameters of one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Site `i` is read from `{prefix}_{i}.map`
    pub prefix: String,
    pub sites: usize,
    /// Samples per site
    pub iterations: usize,
    /// Companion lines after each sample
    pub skip: usize,
    pub outgroup: Option<Outgroup>,
    pub parallel: usize,
    pub outdir: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            sites: 0,
            iterations: 0,
            skip: 2,
            outgroup: None,
            parallel: 1,
            outdir: ".".to_string(),
        }
    }
}

/// Tables of a finished run, with the tree their branches are numbered on.
#[derive(Debug, Clone)]
pub struct Run {
    pub reference: Tree,
    pub tables: RunTables,
}

impl Run {
    pub fn model(&self) -> Model {
        self.tables.model
    }

    pub fn estimate(&self) -> Estimates {
        Estimates::from_tables(&self.tables)
    }
}

fn parse_sample<R: BufRead>(
    reader: &mut SampleReader<R>,
    config: &RunConfig,
) -> anyhow::Result<Tree> {
    let line = reader.next_sample()?;
    let tree = Tree::from_mapping_with_outgroup(&line, config.outgroup.as_ref())
        .with_context(|| format!("{}: sample {}", reader.source(), reader.n_read()))?;
    Ok(tree)
}

/// First tree of site 0; every sample must share its topology
fn load_reference(config: &RunConfig) -> anyhow::Result<Tree> {
    let mut reader = open_site(&config.prefix, 0, config.skip)?;
    parse_sample(&mut reader, config)
}

fn check_config(config: &RunConfig, min_sites: usize) -> anyhow::Result<()> {
    if config.sites < min_sites {
        bail!(
            "At least {} sites are needed, got {}",
            min_sites,
            config.sites
        );
    }
    if config.iterations == 0 {
        bail!("At least one iteration is needed");
    }
    Ok(())
}

fn check_topology(
    reference: &Tree,
    tree: &Tree,
    reader: &SampleReader<impl BufRead>,
) -> anyhow::Result<()> {
    reference
        .check_same_topology(tree)
        .with_context(|| format!("{}: sample {}", reader.source(), reader.n_read()))?;
    Ok(())
}

fn single_site(
    config: &RunConfig,
    reference: &Tree,
    site: usize,
    tables: &mut RunTables,
) -> anyhow::Result<()> {
    let mut reader = open_site(&config.prefix, site, config.skip)?;

    for c in 0..config.iterations {
        let tree = parse_sample(&mut reader, config)?;
        check_topology(reference, &tree, &reader)?;
        tables.fold(c, &single::summarize(&tree)?)?;
    }
    tables.sites += 1;

    log::debug!("Site {} done", site);
    Ok(())
}

fn triplet_window(
    config: &RunConfig,
    reference: &Tree,
    start: usize,
    tables: &mut RunTables,
) -> anyhow::Result<()> {
    let mut readers = [
        open_site(&config.prefix, start, config.skip)?,
        open_site(&config.prefix, start + 1, config.skip)?,
        open_site(&config.prefix, start + 2, config.skip)?,
    ];

    for c in 0..config.iterations {
        let mut trees = Vec::with_capacity(3);
        for reader in readers.iter_mut() {
            let tree = parse_sample(reader, config)?;
            check_topology(reference, &tree, &*reader)?;
            trees.push(tree);
        }
        let stats = triplet::summarize([&trees[0], &trees[1], &trees[2]])
            .with_context(|| format!("Window {} at iteration {}", start, c + 1))?;
        tables.fold(c, &stats)?;
    }
    tables.sites += 1;

    log::debug!("Window {} done", start);
    Ok(())
}

/// Fold units `0..n` into one table per worker, then sum the workers' tables.
///
/// Each worker takes a contiguous run of units and the partial tables are
/// reduced in unit order, so branch lengths end up from the last unit.
fn accumulate<F>(
    model: Model,
    reference: &Tree,
    config: &RunConfig,
    n: usize,
    fold_unit: F,
) -> anyhow::Result<RunTables>
where
    F: Fn(usize, &mut RunTables) -> anyhow::Result<()> + Sync + Send,
{
    let n_branches = reference.n_branches();
    let n_iters = config.iterations;
    let empty = move || RunTables::new(model, n_branches, n_iters);

    (0..n)
        .into_par_iter()
        .try_fold(empty, |mut acc, i| -> anyhow::Result<RunTables> {
            fold_unit(i, &mut acc)?;
            Ok(acc)
        })
        .try_reduce(empty, |a, b| Ok(a.merge(b)?))
}

/// Aggregate every site of a single-site run.
pub fn run_single(config: &RunConfig) -> anyhow::Result<Run> {
    check_config(config, 1)?;
    let reference = load_reference(config)?;
    log::info!(
        "Single-site run: {} sites, {} iterations, {} branches, {} threads",
        config.sites,
        config.iterations,
        reference.n_branches(),
        rayon::current_num_threads()
    );

    let tables = accumulate(Model::Single, &reference, config, config.sites, |site, t| {
        single_site(config, &reference, site, t)
    })?;

    Ok(Run { reference, tables })
}

/// Aggregate every window of three consecutive sites.
pub fn run_triplet(config: &RunConfig) -> anyhow::Result<Run> {
    check_config(config, 3)?;
    let reference = load_reference(config)?;
    log::info!(
        "Triplet run: {} windows, {} iterations, {} branches, {} threads",
        config.sites - 2,
        config.iterations,
        reference.n_branches(),
        rayon::current_num_threads()
    );

    let tables = accumulate(
        Model::Triplet,
        &reference,
        config,
        config.sites - 2,
        |start, t| triplet_window(config, &reference, start, t),
    )?;

    Ok(Run { reference, tables })
}
