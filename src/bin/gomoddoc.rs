use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use gomoddoc::config::{DEFAULT_LOOKUP_TIMEOUT, DEFAULT_OUTPUT};
use gomoddoc::version::DEFAULT_PROXY;
use gomoddoc::{Config, WalkOptions};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "gomoddoc",
    version,
    about = "Generate a single-page HTML reference for a Go module"
)]
struct Cli {
    /// Directory containing go.mod
    module_path: PathBuf,
    #[arg(short, long, default_value = DEFAULT_OUTPUT, help = "Output HTML file")]
    output: PathBuf,
    #[arg(long, help = "Version to show instead of the latest published one")]
    mod_version: Option<String>,
    #[arg(long, default_value = DEFAULT_PROXY, help = "Go module proxy used for version lookup")]
    proxy: String,
    #[arg(long, default_value_t = DEFAULT_LOOKUP_TIMEOUT.as_secs(), help = "Version lookup timeout in seconds")]
    timeout: u64,
    #[arg(long, default_value_t = false, help = "Skip the version lookup")]
    offline: bool,
    #[arg(
        long,
        default_value_t = false,
        help = "Leave out vendor, testdata and directories starting with . or _"
    )]
    skip_go_ignored: bool,
    #[arg(short, long, default_value_t = false, help = "Debug logging")]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_tracing(cli.verbose) {
        eprintln!("warning: logging disabled: {err:#}");
    }

    match run(cli) {
        Ok(path) => {
            println!("{}", path.display());
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<PathBuf> {
    let mut config = Config::new(cli.module_path);
    config.output = cli.output;
    config.version_override = cli.mod_version;
    config.proxy_url = cli.proxy;
    config.lookup_timeout = Duration::from_secs(cli.timeout);
    config.offline = cli.offline;
    if cli.skip_go_ignored {
        config.walk = WalkOptions::GO_IGNORED;
    }

    gomoddoc::generate(&config)
        .with_context(|| format!("documenting {}", config.module_path.display()))
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let default = if verbose { "gomoddoc=debug" } else { "gomoddoc=info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(default.parse()?))
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!(e))
}
