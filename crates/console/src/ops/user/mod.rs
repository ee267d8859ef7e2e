use clap::{Args, Subcommand};

pub mod create;
pub mod delete;
pub mod get;
pub mod list;
pub mod update;

use crate::op::Op;

crate::command_enum! {
    (List, list::List),
    (Get, get::Get),
    (Create, create::Create),
    (Update, update::Update),
    (Delete, delete::Delete),
}

// Rename the generated Command to UsersCommand for clarity
pub type UsersCommand = Command;

/// Work with the user collection.
#[derive(Args, Debug, Clone)]
pub struct Users {
    #[command(subcommand)]
    pub command: UsersCommand,
}

#[async_trait::async_trait]
impl Op for Users {
    type Error = OpError;
    type Output = OpOutput;

    async fn execute(&self, ctx: &crate::op::OpContext) -> Result<Self::Output, Self::Error> {
        self.command.execute(ctx).await
    }
}
