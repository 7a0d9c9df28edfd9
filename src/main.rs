//! gatehouse binary: load configuration, build routes, serve.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use gatehouse::logging::{self, LogFormat};
use gatehouse::{Config, Error, Resolver, app};
use tracing::error;

/// Configuration-driven HTTP dispatcher.
#[derive(Debug, Parser)]
#[command(version, about)]
struct Cli {
    /// Server settings file (JSON or YAML).
    #[arg(long, default_value = "configurations/server.json")]
    server: PathBuf,

    /// Routes file (JSON or YAML).
    #[arg(long, default_value = "configurations/routes.json")]
    routes: PathBuf,

    /// Log line encoding.
    #[arg(long, value_enum, default_value_t)]
    log_format: LogFormat,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    if let Err(e) = logging::init(cli.log_format) {
        eprintln!("cannot initialise logging: {e}");
        return ExitCode::FAILURE;
    }

    match start(&cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn start(cli: &Cli) -> Result<(), Error> {
    let config = Config::load(&cli.server, &cli.routes)?;
    app::run(config, &mut Resolver::new()).await
}
