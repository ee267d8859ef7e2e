use std::fmt;

use clap::Args;
use owo_colors::OwoColorize;

use client::api::login::LoginRequest;
use client::{ApiError, ValidationError};

use crate::progress::spinner;

/// Authenticate against the user service and store the session token.
#[derive(Args, Debug, Clone)]
pub struct Login {
    /// Email to authenticate as
    #[arg(long)]
    pub email: String,

    /// Password for the account
    #[arg(long)]
    pub password: String,
}

#[derive(Debug)]
pub struct LoginOutput {
    pub identity: String,
}

impl fmt::Display for LoginOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} as {}",
            "Logged in".green().bold(),
            self.identity.bold()
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error("invalid login: {0}")]
    Invalid(#[from] ValidationError),

    #[error("login rejected: {0}")]
    Api(#[from] ApiError),
}

#[async_trait::async_trait]
impl crate::op::Op for Login {
    type Error = LoginError;
    type Output = LoginOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        let request = LoginRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
        };
        request.validate()?;

        let bar = spinner("Logging in");
        let result = ctx.state.gateway.run(request.clone()).await;
        bar.finish_and_clear();
        let response = result?;

        ctx.state
            .session
            .set(response.token, Some(request.email.clone()));
        Ok(LoginOutput {
            identity: request.email,
        })
    }
}
