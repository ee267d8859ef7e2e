use std::fmt;
use std::path::PathBuf;

use clap::Args;
use owo_colors::OwoColorize;
use url::Url;

/// Show the effective configuration and session state.
#[derive(Args, Debug, Clone)]
pub struct Status {}

#[derive(Debug)]
pub struct StatusOutput {
    pub roster_dir: PathBuf,
    pub api_base: Url,
    pub has_api_key: bool,
    pub session: Option<SessionLine>,
}

#[derive(Debug)]
pub struct SessionLine {
    pub token_masked: String,
    pub identity: Option<String>,
}

impl fmt::Display for StatusOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} {}", "Roster dir:".dimmed(), self.roster_dir.display())?;
        writeln!(f, "{} {}", "API base:".dimmed(), self.api_base)?;
        writeln!(
            f,
            "{} {}",
            "API key:".dimmed(),
            if self.has_api_key { "set" } else { "not set" }
        )?;
        match &self.session {
            Some(session) => {
                writeln!(f, "{} {}", "Token:".dimmed(), session.token_masked)?;
                let identity = session
                    .identity
                    .as_deref()
                    .unwrap_or("unknown (restored session)");
                write!(f, "{} {}", "Identity:".dimmed(), identity)
            }
            None => write!(f, "{}", "not logged in".red()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StatusError {}

#[async_trait::async_trait]
impl crate::op::Op for Status {
    type Error = StatusError;
    type Output = StatusOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let session = ctx.state.session.session().map(|session| SessionLine {
            token_masked: mask_token(&session.token),
            identity: session.identity,
        });

        Ok(StatusOutput {
            roster_dir: ctx.state.roster_dir.clone(),
            api_base: ctx.state.config.api_base.clone(),
            has_api_key: ctx.state.config.api_key.is_some(),
            session,
        })
    }
}

fn mask_token(token: &str) -> String {
    if token.chars().count() <= 4 {
        return "***".to_string();
    }
    let prefix: String = token.chars().take(4).collect();
    format!("{prefix}***")
}
