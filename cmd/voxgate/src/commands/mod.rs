//! CLI commands module.

mod config;
mod enroll;
mod identify;
mod users;
mod util;

pub use config::ConfigCommand;
pub use enroll::EnrollCommand;
pub use identify::IdentifyCommand;
pub use users::UsersCommand;

pub(crate) use util::*;
