use super::utils;
use clap::*;
use pbsub::libs::mapping::SampleReader;
use pbsub::libs::phylo::{Outgroup, Tree};
use std::io::Write;

// Create clap subcommand arguments
pub fn make_subcommand() -> Command {
    let cmd = Command::new("path")
        .about("Print the substitution history of every branch")
        .after_help(
            r###"
Parses mapping lines and prints one row per branch, in branch number order:

    num  name  length  parent-state  path  terminal

* num: leaves are numbered first in left-to-right order, then internal nodes
  with the root last
* path: `state:duration` segments from the parent end of the branch, joined by `,`
* terminal: the state of the node itself

Every --skip lines after a mapping line are ignored. Empty lines are ignored.

Examples:
1. All lines of a file:
   pbsub path gtr_0.map

2. One sample per three lines, outgroup removed:
   pbsub path gtr_0.map --skip 2 --outgroup outgroup.txt

"###,
        )
        .arg(
            Arg::new("infile")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Input filename. [stdin] for standard input"),
        )
        .arg(
            Arg::new("skip")
                .long("skip")
                .num_args(1)
                .default_value("0")
                .value_parser(value_parser!(usize))
                .help("Companion lines following each sample"),
        )
        .arg(
            Arg::new("outfile")
                .short('o')
                .long("outfile")
                .num_args(1)
                .default_value("stdout")
                .help("Output filename. [stdout] for screen"),
        );
    utils::outgroup_args(cmd)
}

// command implementation
pub fn execute(args: &ArgMatches) -> anyhow::Result<()> {
    //----------------------------
    // Args
    //----------------------------
    let infile = args.get_one::<String>("infile").unwrap();
    let mut writer = intspan::writer(args.get_one::<String>("outfile").unwrap());
    let opt_skip = *args.get_one::<usize>("skip").unwrap();

    let outgroup: Option<Outgroup> = match args.get_one::<String>("outgroup") {
        Some(file) => Some(pbsub::libs::mapping::outgroup_from_file(
            file,
            utils::outgroup_policy(args),
        )?),
        None => None,
    };

    //----------------------------
    // Operating
    //----------------------------
    let mut samples = SampleReader::new(intspan::reader(infile), opt_skip, infile);
    while let Some(line) = samples.try_next_sample()? {
        if line.trim().is_empty() {
            continue;
        }

        let tree = Tree::from_mapping_with_outgroup(&line, outgroup.as_ref())
            .map_err(|e| anyhow::anyhow!("Sample {}: {}", samples.n_read(), e))?;

        //----------------------------
        // Output
        //----------------------------
        writer.write_all(tree.to_path_table().as_bytes())?;
    }

    Ok(())
}
