use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;
use url::Url;

use client::state::{AppState, StateError, CONFIG_FILE};

/// Write the effective configuration to the roster directory. Combine
/// with `--api-base` / `--api-key` to persist non-default settings.
#[derive(Args, Debug, Clone)]
pub struct Init {}

#[derive(Debug)]
pub struct InitOutput {
    pub roster_dir: PathBuf,
    pub config_path: PathBuf,
    pub api_base: Url,
    pub has_api_key: bool,
}

impl fmt::Display for InitOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{} roster at {}",
            "Initialized".green().bold(),
            self.roster_dir.display().to_string().bold()
        )?;
        writeln!(f, "  {} {}", "Config:".dimmed(), self.config_path.display())?;
        writeln!(f, "  {} {}", "API base:".dimmed(), self.api_base)?;
        write!(
            f,
            "  {} {}",
            "API key:".dimmed(),
            if self.has_api_key { "set" } else { "not set" }
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InitError {
    #[error("init failed: {0}")]
    StateFailed(#[from] StateError),
}

#[async_trait::async_trait]
impl crate::op::Op for Init {
    type Error = InitError;
    type Output = InitOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let state = AppState::init(ctx.config_dir.clone(), ctx.state.config.clone())?;

        Ok(InitOutput {
            config_path: state.roster_dir.join(CONFIG_FILE),
            api_base: state.config.api_base.clone(),
            has_api_key: state.config.api_key.is_some(),
            roster_dir: state.roster_dir,
        })
    }
}
