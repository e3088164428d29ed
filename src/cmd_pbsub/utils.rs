use clap::*;
use pbsub::libs::mapping::{outgroup_from_file, Run, RunConfig};
use pbsub::libs::phylo::OutgroupPolicy;
use pbsub::libs::rate::report;
use pbsub::libs::rate::Variant;
use std::io::Write;
use std::path::Path;

/// Outgroup arguments shared by every subcommand
pub fn outgroup_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("outgroup")
            .long("outgroup")
            .num_args(1)
            .help("File of outgroup taxa: their count, then one name per line"),
    )
    .arg(
        Arg::new("lenient")
            .long("lenient")
            .action(ArgAction::SetTrue)
            .help("Keep trees whose outgroup cannot be removed, with a warning"),
    )
}

/// Arguments of a run over per-site mapping files
pub fn run_args(cmd: Command) -> Command {
    let cmd = cmd
        .arg(
            Arg::new("prefix")
                .required(true)
                .num_args(1)
                .index(1)
                .help("Prefix of the mapping files; site i is read from <prefix>_i.map"),
        )
        .arg(
            Arg::new("sites")
                .long("sites")
                .short('n')
                .required(true)
                .num_args(1)
                .value_parser(value_parser!(usize))
                .help("Number of sites"),
        )
        .arg(
            Arg::new("iterations")
                .long("iterations")
                .short('c')
                .required(true)
                .num_args(1)
                .value_parser(value_parser!(usize))
                .help("Number of samples in each file"),
        )
        .arg(
            Arg::new("skip")
                .long("skip")
                .num_args(1)
                .default_value("2")
                .value_parser(value_parser!(usize))
                .help("Companion lines following each sample"),
        )
        .arg(
            Arg::new("variant")
                .long("variant")
                .num_args(1)
                .default_value("type")
                .value_parser(["type", "group"])
                .help("Report substitution types or groups"),
        )
        .arg(
            Arg::new("outdir")
                .long("outdir")
                .short('o')
                .num_args(1)
                .default_value(".")
                .help("Output directory"),
        )
        .arg(
            Arg::new("parallel")
                .long("parallel")
                .short('p')
                .num_args(1)
                .default_value("1")
                .value_parser(value_parser!(usize))
                .help("Number of threads for parallel processing"),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .action(ArgAction::SetTrue)
                .help("Log per-branch totals of changes, state proportions and rates"),
        );
    outgroup_args(cmd)
}

pub fn outgroup_policy(args: &ArgMatches) -> OutgroupPolicy {
    if args.get_flag("lenient") {
        OutgroupPolicy::Lenient
    } else {
        OutgroupPolicy::Strict
    }
}

pub fn run_config(args: &ArgMatches) -> anyhow::Result<RunConfig> {
    let outgroup = match args.get_one::<String>("outgroup") {
        Some(file) => Some(outgroup_from_file(file, outgroup_policy(args))?),
        None => None,
    };

    Ok(RunConfig {
        prefix: args.get_one::<String>("prefix").unwrap().to_string(),
        sites: *args.get_one::<usize>("sites").unwrap(),
        iterations: *args.get_one::<usize>("iterations").unwrap(),
        skip: *args.get_one::<usize>("skip").unwrap(),
        outgroup,
        parallel: *args.get_one::<usize>("parallel").unwrap(),
        outdir: args.get_one::<String>("outdir").unwrap().to_string(),
    })
}

pub fn variant(args: &ArgMatches) -> Variant {
    match args.get_one::<String>("variant").unwrap().as_str() {
        "group" => Variant::Group,
        _ => Variant::Type,
    }
}

/// Size the global thread pool
pub fn init_threads(config: &RunConfig) -> anyhow::Result<()> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(config.parallel)
        .build_global()?;
    Ok(())
}

/// Write one report per type (or group) and `substitutionLength.txt`
pub fn write_reports(
    run: &Run,
    outdir: &str,
    variant: Variant,
    verbose: bool,
) -> anyhow::Result<()> {
    std::fs::create_dir_all(outdir)?;
    let est = run.estimate();
    if verbose {
        log::info!(
            "Branch summary\n{}",
            report::branch_summary(&run.tables, &est).trim_end()
        );
    }

    for k in 0..est.n_kinds(variant) {
        let path = Path::new(outdir).join(report::estb_filename(k, variant));
        let mut writer = intspan::writer(&path.to_string_lossy());
        writer.write_all(report::estb_report(&run.reference, &est, k, variant)?.as_bytes())?;
        log::info!("Wrote {}", path.display());
    }

    let path = Path::new(outdir).join("substitutionLength.txt");
    let mut writer = intspan::writer(&path.to_string_lossy());
    writer.write_all(report::substitution_length(&est).as_bytes())?;
    log::info!("Wrote {}", path.display());

    Ok(())
}
