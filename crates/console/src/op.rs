//! One trait per console operation plus the context they all run with.

use std::fmt;
use std::path::PathBuf;

use async_trait::async_trait;
use client::state::{AppState, StateError};
use url::Url;

/// Shared context handed to every operation.
pub struct OpContext {
    /// Directory override as given on the command line; `None` means the
    /// default home location.
    pub config_dir: Option<PathBuf>,
    pub state: AppState,
}

impl OpContext {
    pub fn load(
        config_dir: Option<PathBuf>,
        api_base: Option<Url>,
        api_key: Option<String>,
    ) -> Result<Self, StateError> {
        let state = AppState::load(config_dir.clone(), api_base, api_key)?;
        Ok(Self { config_dir, state })
    }
}

#[async_trait]
pub trait Op {
    type Error: std::error::Error + Send + Sync + 'static;
    type Output: fmt::Display + Send;

    async fn execute(&self, ctx: &OpContext) -> Result<Self::Output, Self::Error>;
}

#[derive(Debug, thiserror::Error)]
#[error("not logged in; run `roster login` first")]
pub struct NotLoggedIn;

/// Gate applied by every operation on the protected collection, before
/// anything touches the network.
pub fn require_session(ctx: &OpContext) -> Result<(), NotLoggedIn> {
    if ctx.state.session.is_logged_in() {
        Ok(())
    } else {
        tracing::debug!("refusing gated operation without a session");
        Err(NotLoggedIn)
    }
}

/// Generates the clap `Command` enum for a set of operations, the
/// matching `OpOutput`/`OpError` enums, and the `Op` impl that
/// dispatches to the selected operation.
#[macro_export]
macro_rules! command_enum {
    ($(($variant:ident, $ty:ty)),* $(,)?) => {
        #[derive(Debug, Clone, Subcommand)]
        pub enum Command {
            $($variant($ty),)*
        }

        #[derive(Debug)]
        pub enum OpOutput {
            $($variant(<$ty as $crate::op::Op>::Output),)*
        }

        impl ::std::fmt::Display for OpOutput {
            fn fmt(&self, f: &mut ::std::fmt::Formatter<'_>) -> ::std::fmt::Result {
                match self {
                    $(OpOutput::$variant(output) => ::std::fmt::Display::fmt(output, f),)*
                }
            }
        }

        #[derive(Debug, thiserror::Error)]
        pub enum OpError {
            $(
                #[error(transparent)]
                $variant(<$ty as $crate::op::Op>::Error),
            )*
        }

        #[async_trait::async_trait]
        impl $crate::op::Op for Command {
            type Error = OpError;
            type Output = OpOutput;

            async fn execute(
                &self,
                ctx: &$crate::op::OpContext,
            ) -> Result<Self::Output, Self::Error> {
                match self {
                    $(
                        Command::$variant(op) => op
                            .execute(ctx)
                            .await
                            .map(OpOutput::$variant)
                            .map_err(OpError::$variant),
                    )*
                }
            }
        }
    };
}
