extern crate clap;
use clap::*;

mod cmd_pbsub;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .format_timestamp(None)
        .format_target(false)
        .init();

    let app = Command::new("pbsub")
        .version(crate_version!())
        .author(crate_authors!())
        .about("`pbsub` - Branch substitution rates from PhyloBayes stochastic mappings")
        .propagate_version(true)
        .arg_required_else_help(true)
        .color(ColorChoice::Auto)
        .subcommand(cmd_pbsub::single::make_subcommand())
        .subcommand(cmd_pbsub::triplet::make_subcommand())
        .subcommand(cmd_pbsub::path::make_subcommand())
        .after_help(
            r###"Subcommands:

* Rates:
    * single  - 12 substitution types of single sites
    * triplet - middle-site changes in CpG context of three consecutive sites

* Inspection:
    * path    - substitution history of every branch of a mapping

Logging goes to stderr; set RUST_LOG=debug for per-site progress.

"###,
        );

    // Check which subcomamnd the user ran...
    match app.get_matches().subcommand() {
        Some(("single", sub_matches)) => cmd_pbsub::single::execute(sub_matches),
        Some(("triplet", sub_matches)) => cmd_pbsub::triplet::execute(sub_matches),
        Some(("path", sub_matches)) => cmd_pbsub::path::execute(sub_matches),
        _ => unreachable!(),
    }?;

    Ok(())
}
