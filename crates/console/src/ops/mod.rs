use clap::Subcommand;

pub mod init;
pub mod login;
pub mod logout;
pub mod status;
pub mod user;

pub use init::Init;
pub use login::Login;
pub use logout::Logout;
pub use status::Status;
pub use user::Users;

use crate::op::Op;

crate::command_enum! {
    (Init, init::Init),
    (Login, login::Login),
    (Logout, logout::Logout),
    (Status, status::Status),
    (Users, user::Users),
}
