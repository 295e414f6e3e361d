// aimesh-convert - AIMesh to JSON heightmap converter
//
//   aimesh-convert <input.aimesh> <output.json>
//
// Any other number of positional arguments prints the usage line and exits
// with status 1 before touching the filesystem.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use clap::error::ErrorKind;

use aimesh::settings::CONFIG_ENV_PREFIX;
use aimesh::{ConvertSettings, convert_file};
use aimesh_shared::DEFAULT_LOG_LEVEL;
use aimesh_shared::config::Config;
use aimesh_shared::log::{initialize_logging, map_log_level};

const USAGE: &str = "Usage: aimesh-convert <input.aimesh> <output.json>";
const LOG_FILE_NAME: &str = "aimesh-convert.log";

#[derive(Parser, Debug)]
#[command(name = "aimesh-convert")]
#[command(about = "Convert an AIMesh navigation mesh into a JSON heightmap")]
#[command(version)]
struct Cli {
    /// AIMesh file to read
    input: PathBuf,

    /// JSON file to write
    output: PathBuf,

    /// Console log level override (0=Minimum, 1=Basic, 2=Detail, 3=Full/Debug, 4=Trace)
    #[arg(short, long, value_name = "LEVEL")]
    log_level: Option<i32>,

    /// Optional INI configuration file
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Number of rasterizer threads (default 1)
    #[arg(long = "threads")]
    threads: Option<usize>,
}

fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) if matches!(err.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            err.exit()
        }
        Err(err) => {
            eprintln!("{}", err.render());
            eprintln!("{USAGE}");
            std::process::exit(1);
        }
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load(path, CONFIG_ENV_PREFIX)
            .with_context(|| format!("Could not read configuration file {}", path.display())),
        None => Ok(Config::new(CONFIG_ENV_PREFIX)),
    }
}

fn init_logging(cli: &Cli, config: Option<&Config>) {
    let level = cli
        .log_level
        .or_else(|| config.map(|c| c.get_int_default("Log.Level", DEFAULT_LOG_LEVEL)))
        .unwrap_or(DEFAULT_LOG_LEVEL);
    let log_dir = config
        .map(|c| c.get_string_default("Log.Dir", ""))
        .filter(|dir| !dir.is_empty());

    initialize_logging(log_dir.as_deref(), map_log_level(level), LOG_FILE_NAME);
}

fn run(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    let mut settings = ConvertSettings::from_config(config)?;
    if let Some(threads) = cli.threads {
        settings.threads = threads;
    }

    tracing::info!(
        "Converting {} -> {} (texture={} threads={})",
        cli.input.display(),
        cli.output.display(),
        settings.texture_size,
        settings.threads
    );

    convert_file(&cli.input, &cli.output, &settings)
        .with_context(|| format!("Error processing NavMesh {}", cli.input.display()))?;

    println!("NavMesh data successfully written to {}", cli.output.display());
    Ok(())
}

fn main() {
    let cli = parse_cli();

    let config = load_config(cli.config.as_deref());
    init_logging(&cli, config.as_ref().ok());

    if let Err(err) = config.and_then(|config| run(&cli, &config)) {
        tracing::error!("{:#}", err);
        std::process::exit(1);
    }
}
