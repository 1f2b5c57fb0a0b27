mod output;

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use avm1emit_core::{CfgSource, LowerOptions, disassemble, generate_error_report};
use clap::{Arg, ArgAction, ArgMatches, Command};
use log::{debug, info};

use output::FormatStyle;

fn main() -> ExitCode {
    let cli = Command::new("avm1emit")
        .version("0.1.0")
        .about("Lower AVM1 control-flow graphs to linear bytecode");

    let cli = setup_cli(cli);
    let matches = cli.get_matches();
    // -v may come before or after the subcommand
    let verbosity = match matches.subcommand() {
        Some((_, sub_m)) => sub_m.get_count("verbose").max(matches.get_count("verbose")),
        None => matches.get_count("verbose"),
    };
    init_logging(verbosity);

    match dispatch_commands(&matches) {
        Ok(()) => ExitCode::SUCCESS,
        Err(()) => ExitCode::FAILURE,
    }
}

/// Sets up the CLI with its subcommands and arguments.
fn setup_cli(cli: Command) -> Command {
    cli.arg(
        Arg::new("verbose")
            .help("Raise log verbosity (-v debug, -vv trace)")
            .short('v')
            .long("verbose")
            .action(ArgAction::Count)
            .global(true),
    )
    .subcommand(
        Command::new("build")
            .about("Lower CFG documents (JSON) to AVM1 bytecode")
            .arg(
                Arg::new("input")
                    .help("CFG documents, as paths or glob patterns")
                    .required(true)
                    .num_args(1..)
                    .index(1),
            )
            .arg(
                Arg::new("output")
                    .help("Output file; only valid with a single input")
                    .short('o')
                    .long("output")
                    .value_parser(clap::value_parser!(PathBuf))
                    .value_name("FILE"),
            )
            .arg(
                Arg::new("no-terminator")
                    .help("Do not append an End action after the top-level region")
                    .long("no-terminator")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("suppress-unreachable-tail")
                    .help("Skip the trailer of blocks that already end with Return or Throw")
                    .long("suppress-unreachable-tail")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("no-validate")
                    .help("Skip the duplicate label check")
                    .long("no-validate")
                    .action(ArgAction::SetTrue),
            )
            .arg(
                Arg::new("max-depth")
                    .help("Deepest allowed nesting of clauses, scopes and functions")
                    .long("max-depth")
                    .value_parser(clap::value_parser!(usize))
                    .value_name("N"),
            ),
    )
    .subcommand(
        Command::new("disasm")
            .about("List the actions of an AVM1 bytecode file")
            .arg(
                Arg::new("file")
                    .help("The bytecode file to list")
                    .required(true)
                    .value_parser(clap::value_parser!(PathBuf))
                    .index(1),
            ),
    )
}

fn init_logging(verbosity: u8) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default = match verbosity {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    fmt().with_env_filter(filter).with_writer(std::io::stderr).without_time().init();
}

/// Dispatches the command based on the parsed arguments.
fn dispatch_commands(matches: &ArgMatches) -> Result<(), ()> {
    let style = FormatStyle::default();
    match matches.subcommand() {
        Some(("build", sub_m)) => build(sub_m, &style),
        Some(("disasm", sub_m)) => disasm(sub_m, &style),
        _ => {
            eprintln!("No valid subcommand was used. Use --help for more information.");
            Err(())
        }
    }
}

fn lower_options(sub_m: &ArgMatches) -> LowerOptions {
    let defaults = LowerOptions::default();
    LowerOptions {
        append_terminator: !sub_m.get_flag("no-terminator"),
        suppress_terminator_for_unreachable_tail: sub_m.get_flag("suppress-unreachable-tail"),
        validate: !sub_m.get_flag("no-validate"),
        max_depth: sub_m.get_one::<usize>("max-depth").copied().unwrap_or(defaults.max_depth),
    }
}

fn build(sub_m: &ArgMatches, style: &FormatStyle) -> Result<(), ()> {
    let patterns: Vec<&String> = sub_m.get_many::<String>("input").into_iter().flatten().collect();
    let inputs = expand_inputs(&patterns, style)?;
    let output = sub_m.get_one::<PathBuf>("output");

    if output.is_some() && inputs.len() != 1 {
        eprintln!(
            "{}",
            style.error.apply_to(format!("--output needs exactly one input, {} given", inputs.len()))
        );
        return Err(());
    }

    let options = lower_options(sub_m);
    debug!("lowering {} document(s) with {:?}", inputs.len(), options);

    let mut failed = false;
    for input in inputs {
        let target = match output {
            Some(path) => path.clone(),
            None => input.with_extension("avm1"),
        };

        let source = match CfgSource::load(input) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("{}", style.error.apply_to(generate_error_report(&*e)));
                failed = true;
                continue;
            }
        };

        let bytes = match source.lower(&options) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("{}", style.error.apply_to(format!("{}: {}", source.name, generate_error_report(&*e))));
                failed = true;
                continue;
            }
        };

        if let Err(e) = fs::write(&target, &bytes) {
            eprintln!("{}", style.error.apply_to(format!("cannot write {}: {}", target.display(), e)));
            failed = true;
            continue;
        }

        info!("wrote {} bytes to {}", bytes.len(), target.display());
        println!(
            "{} {} -> {} ({} blocks, {} bytes)",
            style.success.apply_to("built"),
            source.name,
            target.display(),
            source.block_count(),
            bytes.len()
        );
    }

    if failed { Err(()) } else { Ok(()) }
}

/// Paths are taken as-is; anything with glob metacharacters is expanded.
fn expand_inputs(patterns: &[&String], style: &FormatStyle) -> Result<Vec<PathBuf>, ()> {
    let mut inputs = Vec::new();
    for pattern in patterns {
        if !pattern.contains(['*', '?', '[']) {
            inputs.push(PathBuf::from(pattern.as_str()));
            continue;
        }

        let paths = glob::glob(pattern).map_err(|e| {
            eprintln!("{}", style.error.apply_to(format!("bad pattern '{}': {}", pattern, e)));
        })?;
        let before = inputs.len();
        inputs.extend(paths.filter_map(Result::ok));
        if inputs.len() == before {
            eprintln!("{}", style.warning.apply_to(format!("'{}' matched no files", pattern)));
        }
    }

    if inputs.is_empty() {
        eprintln!("{}", style.error.apply_to("no input documents"));
        return Err(());
    }
    Ok(inputs)
}

fn disasm(sub_m: &ArgMatches, style: &FormatStyle) -> Result<(), ()> {
    let Some(file) = sub_m.get_one::<PathBuf>("file") else {
        return Err(());
    };

    let bytes = fs::read(file).map_err(|e| {
        eprintln!("{}", style.error.apply_to(format!("cannot read {}: {}", file.display(), e)));
    })?;
    let actions = disassemble(&bytes).map_err(|e| {
        eprintln!("{}", style.error.apply_to(generate_error_report(&e)));
    })?;

    println!("{}", style.title.apply_to(file.display()));
    println!("{}", output::action_table(&actions));
    Ok(())
}
