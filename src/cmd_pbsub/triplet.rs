use super::utils;
use clap::*;
use pbsub::libs::mapping;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("triplet")
        .about("Estimate branch rates of the middle site in CpG context")
        .after_help(
            r###"
Slides a window over three consecutive sites (i, i+1, i+2) and merges their
histories along every branch. Changes of the middle site are classified by
whether the triplet they leave holds a CpG, and by transition or transversion.

Types:
* 0 non-CpG transversion
* 1 non-CpG transition
* 2 CpG transversion
* 3 CpG transition

Exposure is the time the middle site spends in C or G outside CpG, in A or T,
or inside a CpG.

Input and output follow `pbsub single`; at least 3 sites are needed.
--variant group writes the 9 groups (o.estb.group0 .. o.estb.group8).

Examples:
1. Basic usage:
   pbsub triplet data/gtr --sites 10 --iterations 100 --outgroup outgroup.txt

2. Report groups:
   pbsub triplet data/gtr -n 10 -c 100 --variant group -o results

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
    let run = mapping::run_triplet(&config)?;

    //----------------------------
    // Output
    //----------------------------
    utils::write_reports(&run, &config.outdir, variant, args.get_flag("verbose"))?;

    Ok(())
}
