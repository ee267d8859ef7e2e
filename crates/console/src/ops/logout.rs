use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

/// Clear the session, forgetting the stored token.
#[derive(Args, Debug, Clone)]
pub struct Logout {}

#[derive(Debug)]
pub struct LogoutOutput {
    pub was_logged_in: bool,
}

impl fmt::Display for LogoutOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.was_logged_in {
            write!(f, "{}", "Logged out".green().bold())
        } else {
            write!(f, "No session to clear")
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LogoutError {}

#[async_trait::async_trait]
impl crate::op::Op for Logout {
    type Error = LogoutError;
    type Output = LogoutOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let was_logged_in = ctx.state.session.is_logged_in();
        ctx.state.session.clear();
        Ok(LogoutOutput { was_logged_in })
    }
}
