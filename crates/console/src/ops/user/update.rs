use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;
use time::OffsetDateTime;

use client::api::users::{UpdateUserBody, UpdateUserRequest};
use client::{ApiError, ValidationError};

use crate::op::NotLoggedIn;
use crate::progress::spinner;

/// Change fields of an existing user.
///
/// Only the flags given are sent; everything else keeps its current value.
/// Names are stored as a single field, so changing one half of the name
/// reads the current record first to keep the other half.
#[derive(Args, Debug, Clone)]
pub struct Update {
    /// Id of the user to change
    pub id: u64,

    /// New given name
    #[arg(long)]
    pub first_name: Option<String>,

    /// New family name
    #[arg(long)]
    pub last_name: Option<String>,

    /// New email address
    #[arg(long)]
    pub email: Option<String>,

    /// New avatar link
    #[arg(long)]
    pub avatar: Option<String>,

    /// New job title
    #[arg(long)]
    pub job: Option<String>,
}

#[derive(Debug)]
pub struct UpdateOutput {
    pub id: u64,
    pub fields: UpdateUserBody,
    pub updated_at: OffsetDateTime,
}

impl fmt::Display for UpdateOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} user {}", "Updated".green().bold(), self.id)?;
        if let Some(name) = &self.fields.name {
            writeln!(f, "  {} {}", "Name:".dimmed(), name)?;
        }
        if let Some(email) = &self.fields.email {
            writeln!(f, "  {} {}", "Email:".dimmed(), email)?;
        }
        if let Some(job) = &self.fields.job {
            writeln!(f, "  {} {}", "Job:".dimmed(), job)?;
        }
        if let Some(avatar) = &self.fields.avatar {
            writeln!(f, "  {} {}", "Avatar:".dimmed(), avatar)?;
        }
        write!(f, "  {} {}", "Updated:".dimmed(), self.updated_at)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateError {
    #[error(transparent)]
    Auth(#[from] NotLoggedIn),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("the service rejected the session ({0}); run `roster login` again")]
    SessionRejected(ApiError),

    #[error("could not update user: {0}")]
    Api(ApiError),
}

impl From<ApiError> for UpdateError {
    fn from(err: ApiError) -> Self {
        if err.is_unauthorized() {
            UpdateError::SessionRejected(err)
        } else {
            UpdateError::Api(err)
        }
    }
}

impl Update {
    /// Resolve the name to send, if any half of it was given.
    async fn merged_name(&self, ctx: &crate::op::OpContext) -> Result<Option<String>, UpdateError> {
        let (first, last) = match (&self.first_name, &self.last_name) {
            (None, None) => return Ok(None),
            (Some(first), Some(last)) => (first.trim().to_string(), last.trim().to_string()),
            _ => {
                // One half given; fill the other from the current record.
                let current = ctx.state.cache.user(self.id, false).await.into_result()?;
                (
                    self.first_name
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or(current.first_name.as_str())
                        .to_string(),
                    self.last_name
                        .as_deref()
                        .map(str::trim)
                        .unwrap_or(current.last_name.as_str())
                        .to_string(),
                )
            }
        };
        if first.is_empty() {
            return Err(ValidationError::Required("first name").into());
        }
        if last.is_empty() {
            return Err(ValidationError::Required("last name").into());
        }
        Ok(Some(format!("{first} {last}")))
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

#[async_trait::async_trait]
impl crate::op::Op for Update {
    type Error = UpdateError;
    type Output = UpdateOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        crate::op::require_session(ctx)?;

        let name = self.merged_name(ctx).await?;
        let body = UpdateUserBody {
            name,
            job: trimmed(self.job.as_deref()),
            email: trimmed(self.email.as_deref()),
            avatar: trimmed(self.avatar.as_deref()),
        };

        let request = UpdateUserRequest { id: self.id, body };
        request.validate()?;

        let bar = spinner("Updating user");
        let result = ctx.state.gateway.run(request).await;
        bar.finish_and_clear();
        let response = result?;

        Ok(UpdateOutput {
            id: self.id,
            fields: response.body,
            updated_at: response.updated_at,
        })
    }
}
