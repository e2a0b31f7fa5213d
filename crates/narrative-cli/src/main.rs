//! `narrative` - derive narrative graphs from observation files and inspect
//! the content-addressed store behind them

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use narrative_codec::frontend_to_json;
use narrative_core::{parse_observations, NarrativeConfig, NarrativePipeline};
use narrative_store::ContentAddressedStore;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

fn cli() -> Command {
    Command::new("narrative")
        .version(narrative_core::VERSION)
        .about("Deterministic emotion narratives with content-addressed caching")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("TOML configuration file"),
        )
        .arg(
            Arg::new("store")
                .long("store")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Storage root, overriding the configuration"),
        )
        .arg(
            Arg::new("log-level")
                .long("log-level")
                .global(true)
                .help("Log filter, e.g. `debug` or `narrative_store=trace` (default: RUST_LOG, then info)"),
        )
        .arg(
            Arg::new("log-json")
                .long("log-json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Emit logs as JSON lines"),
        )
        .subcommand(
            Command::new("derive")
                .about("Derive and cache the narrative graph of one subject, printing the frontend payload")
                .arg(
                    Arg::new("subject")
                        .long("subject")
                        .required(true)
                        .help("Subject identifier"),
                )
                .arg(
                    Arg::new("input")
                        .long("input")
                        .required(true)
                        .value_parser(value_parser!(PathBuf))
                        .help("JSON array of observations"),
                ),
        )
        .subcommand(
            Command::new("show")
                .about("Print a stored payload")
                .arg(Arg::new("fingerprint").required(true).help("Payload fingerprint")),
        )
        .subcommand(
            Command::new("invalidate")
                .about("Remove a stored payload")
                .arg(Arg::new("fingerprint").required(true).help("Payload fingerprint")),
        )
        .subcommand(Command::new("list").about("List stored fingerprints"))
        .subcommand(Command::new("sweep").about("Remove temporary files left by interrupted writes"))
}

fn init_logging(matches: &ArgMatches) -> Result<()> {
    let filter = match matches.get_one::<String>("log-level") {
        Some(level) => EnvFilter::try_new(level).context("invalid --log-level")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = if matches.get_flag("log-json") {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow::anyhow!(e))
}

fn load_config(matches: &ArgMatches) -> Result<NarrativeConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => NarrativeConfig::load(path)
            .with_context(|| format!("loading configuration from {}", path.display()))?,
        None => NarrativeConfig::default(),
    };
    if let Some(root) = matches.get_one::<PathBuf>("store") {
        config = config.with_storage_root(root);
    }
    debug!(?config, "configuration loaded");
    Ok(config)
}

fn required<'a, T: Clone + Send + Sync + 'static>(args: &'a ArgMatches, id: &str) -> Result<&'a T> {
    args.get_one::<T>(id)
        .with_context(|| format!("missing required argument '{id}'"))
}

/// Returns `false` when the requested record does not exist
fn run(matches: &ArgMatches) -> Result<bool> {
    let config = load_config(matches)?;
    let pipeline = NarrativePipeline::new(config)?;
    let cache = pipeline.cache();

    match matches.subcommand() {
        Some(("derive", args)) => {
            let subject = required::<String>(args, "subject")?;
            let input = required::<PathBuf>(args, "input")?;
            let text = std::fs::read_to_string(input)
                .with_context(|| format!("reading observations from {}", input.display()))?;
            let observations = parse_observations(&text)?;

            let payload = pipeline.derive(subject, observations)?;
            info!(graph_id = %payload.graph_id, nodes = payload.node_count, edges = payload.edge_count, "derived");
            println!("{}", frontend_to_json(&payload)?);
            Ok(true)
        }
        Some(("show", args)) => {
            let fingerprint = ContentAddressedStore::parse_fingerprint(required::<String>(args, "fingerprint")?)?;
            match cache.get(&fingerprint)? {
                Some(payload) => {
                    println!("{}", payload.to_json()?);
                    Ok(true)
                }
                None => {
                    eprintln!("no payload stored for {fingerprint}");
                    Ok(false)
                }
            }
        }
        Some(("invalidate", args)) => {
            let fingerprint = ContentAddressedStore::parse_fingerprint(required::<String>(args, "fingerprint")?)?;
            if cache.invalidate(&fingerprint)? {
                println!("removed {fingerprint}");
                Ok(true)
            } else {
                eprintln!("no payload stored for {fingerprint}");
                Ok(false)
            }
        }
        Some(("list", _)) => {
            for fingerprint in cache.store().fingerprints()? {
                println!("{fingerprint}");
            }
            Ok(true)
        }
        Some(("sweep", _)) => {
            let removed = cache.store().sweep_temporaries()?;
            println!("removed {removed} temporary file(s)");
            Ok(true)
        }
        _ => Ok(false),
    }
}

fn main() -> ExitCode {
    let matches = cli().get_matches();
    if let Err(e) = init_logging(&matches) {
        eprintln!("error: {e:#}");
        return ExitCode::FAILURE;
    }
    match run(&matches) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
