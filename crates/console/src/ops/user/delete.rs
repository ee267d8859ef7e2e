use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use client::api::users::DeleteUserRequest;
use client::ApiError;

use crate::op::NotLoggedIn;
use crate::progress::spinner;

/// Remove a user from the collection.
#[derive(Args, Debug, Clone)]
pub struct Delete {
    /// Id of the user to remove
    pub id: u64,

    /// Skip the confirmation check
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug)]
pub struct DeleteOutput {
    pub id: u64,
}

impl fmt::Display for DeleteOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} user {}", "Deleted".green().bold(), self.id)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    Auth(#[from] NotLoggedIn),

    #[error("refusing to delete user {0} without --yes")]
    NeedsConfirmation(u64),

    #[error("the service rejected the session ({0}); run `roster login` again")]
    SessionRejected(ApiError),

    #[error("could not delete user: {0}")]
    Api(ApiError),
}

impl From<ApiError> for DeleteError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            DeleteError::SessionRejected(err)
        } else {
            DeleteError::Api(err)
        }
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Delete {
    type Error = DeleteError;
    type Output = DeleteOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        crate::op::require_session(ctx)?;

        if !self.yes {
            return Err(DeleteError::NeedsConfirmation(self.id));
        }

        let bar = spinner("Deleting user");
        let result = ctx.state.gateway.run(DeleteUserRequest { id: self.id }).await;
        bar.finish_and_clear();
        result?;

        Ok(DeleteOutput { id: self.id })
    }
}
