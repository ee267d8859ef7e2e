mod op;
mod ops;
mod progress;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::op::{Op, OpContext};

#[derive(Parser, Debug)]
#[command(name = "roster", version, about = "Manage users on a remote roster service")]
struct Cli {
    /// Directory holding config and session state (default: ~/.roster)
    #[arg(long, global = true, env = "ROSTER_DIR")]
    config_dir: Option<PathBuf>,

    /// Base URL of the user service
    #[arg(long, global = true, env = "ROSTER_API_BASE")]
    api_base: Option<Url>,

    /// Static API key sent with every request
    #[arg(long, global = true, env = "ROSTER_API_KEY")]
    api_key: Option<String>,

    #[command(subcommand)]
    command: ops::Command,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let ctx = match OpContext::load(cli.config_dir, cli.api_base, cli.api_key) {
        Ok(ctx) => ctx,
        Err(err) => {
            eprintln!("error: {err}");
            return ExitCode::FAILURE;
        }
    };

    match cli.command.execute(&ctx).await {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
