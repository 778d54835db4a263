//! Users domain - accounts that can log in and hold roles

pub mod bootstrap;
pub mod data;
pub mod edges;
pub mod models;

pub use bootstrap::{ensure_admin, AdminAccount, BootstrapOutcome};
pub use data::{CreateUserInput, UpdateUserInput, UserData};
pub use edges::*;
pub use models::{NewUser, User, UserChanges};
