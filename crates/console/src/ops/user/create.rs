use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;
use time::OffsetDateTime;

use client::api::users::{CreateUserRequest, DEFAULT_JOB};
use client::{ApiError, ValidationError};

use crate::op::NotLoggedIn;
use crate::progress::spinner;

/// Add a user to the collection.
#[derive(Args, Debug, Clone)]
pub struct Create {
    /// Given name of the new user
    #[arg(long)]
    pub first_name: String,

    /// Family name of the new user
    #[arg(long)]
    pub last_name: String,

    /// Email address of the new user
    #[arg(long)]
    pub email: String,

    /// Avatar image link
    #[arg(long)]
    pub avatar: String,

    /// Job title
    #[arg(long, default_value = DEFAULT_JOB)]
    pub job: String,
}

#[derive(Debug)]
pub struct CreateOutput {
    pub id: String,
    pub name: String,
    pub job: String,
    pub created_at: OffsetDateTime,
}

impl fmt::Display for CreateOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} user {}", "Created".green().bold(), self.name.bold())?;
        writeln!(f, "  {} {}", "Id:".dimmed(), self.id)?;
        writeln!(f, "  {} {}", "Job:".dimmed(), self.job)?;
        write!(f, "  {} {}", "Created:".dimmed(), self.created_at)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CreateError {
    #[error(transparent)]
    Auth(#[from] NotLoggedIn),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("the service rejected the session ({0}); run `roster login` again")]
    SessionRejected(ApiError),

    #[error("could not create user: {0}")]
    Api(ApiError),
}

impl From<ApiError> for CreateError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            CreateError::SessionRejected(err)
        } else {
            CreateError::Api(err)
        }
    }
}

#[async_trait::async_trait]
impl crate::op::Op for Create {
    type Error = CreateError;
    type Output = CreateOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        crate::op::require_session(ctx)?;

        let first = self.first_name.trim();
        let last = self.last_name.trim();
        if first.is_empty() {
            return Err(ValidationError::Required("first name").into());
        }
        if last.is_empty() {
            return Err(ValidationError::Required("last name").into());
        }

        let job = match self.job.trim() {
            "" => DEFAULT_JOB.to_string(),
            job => job.to_string(),
        };

        let request = CreateUserRequest {
            name: format!("{first} {last}"),
            job,
            email: self.email.trim().to_string(),
            avatar: self.avatar.trim().to_string(),
        };
        request.validate()?;

        let bar = spinner("Creating user");
        let result = ctx.state.gateway.run(request).await;
        bar.finish_and_clear();
        let response = result?;

        Ok(CreateOutput {
            id: response.id,
            name: response.name,
            job: response.job,
            created_at: response.created_at,
        })
    }
}
