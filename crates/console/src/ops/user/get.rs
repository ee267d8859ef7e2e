use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use client::api::users::UserRecord;
use client::ApiError;

use crate::op::NotLoggedIn;

/// Show a single user.
#[derive(Args, Debug, Clone)]
pub struct Get {
    /// Id of the user to show
    pub id: u64,

    /// Bypass the cache and fetch the record again
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Debug)]
pub struct GetOutput {
    pub user: UserRecord,
    pub stale: bool,
}

impl fmt::Display for GetOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.user.full_name().bold())?;
        if self.stale {
            write!(f, " {}", "(stale)".yellow())?;
        }
        writeln!(f)?;
        writeln!(f, "  {} {}", "Id:".dimmed(), self.user.id)?;
        writeln!(f, "  {} {}", "Email:".dimmed(), self.user.email)?;
        write!(
            f,
            "  {} {}",
            "Avatar:".dimmed(),
            self.user.avatar.as_deref().unwrap_or("none")
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GetError {
    #[error(transparent)]
    Auth(#[from] NotLoggedIn),

    #[error("the service rejected the session ({0}); run `roster login` again")]
    SessionRejected(ApiError),

    #[error("could not load user: {0}")]
    Api(ApiError),
}

impl From<ApiError> for GetError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            GetError::SessionRejected(err)
        } else {
            GetError::Api(err)
        }
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Get {
    type Error = GetError;
    type Output = GetOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        crate::op::require_session(ctx)?;

        let snapshot = ctx.state.cache.user(self.id, self.refresh).await;
        let stale = snapshot.stale;
        let record = snapshot.into_result()?;

        Ok(GetOutput {
            user: (*record).clone(),
            stale,
        })
    }
}
