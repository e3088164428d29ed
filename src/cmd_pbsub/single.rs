use super::utils;
use clap::*;
use pbsub::libs::mapping;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("single")
        .about("Estimate branch rates of the 12 single-site substitution types")
        .after_help(
            r###"
Reads the stochastic mappings of N sites, each from its own file <prefix>_i.map, and
estimates per-branch substitution rates from C posterior samples.

Input:
* Each file holds C samples; a sample is one mapping line followed by --skip
  companion lines, which are ignored
* A mapping line is a Newick-like tree whose nodes are written name_state and whose
  branches carry the substitution history, e.g. `A_A:0.1:C:0.5:C`
* All samples must share the topology of the first tree of site 0

Output, in --outdir:
* o.estb.type0 .. o.estb.type11, one per substitution type
  (o.estb.group0 .. o.estb.group5 with --variant group)
  Each holds the tree with branch rates, the tip numbering, the parent-child
  adjacency and the branch-by-branch variance-covariance matrix
* substitutionLength.txt, the mean group rate of every branch

Substitution types, in order:
  A->G A->C A->T G->A G->C G->T C->A C->G C->T T->A T->G T->C

Examples:
1. Ten sites with 100 samples each:
   pbsub single data/gtr --sites 10 --iterations 100

2. Remove the outgroup and use 4 threads:
   pbsub single data/gtr -n 10 -c 100 --outgroup outgroup.txt -p 4 -o results

"###,
        );
    utils::run_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let config = utils::run_config(args)?;
    let variant = utils::variant(args);
    utils::init_threads(&config)?;

    //----------------------------
    // Operating
    //----------------------------
    let run = mapping::run_single(&config)?;

    //----------------------------
    // Output
    //----------------------------
    utils::write_reports(&run, &config.outdir, variant, args.get_flag("verbose"))?;

    Ok(())
}
