//! GraphQL edge resolvers for users

pub mod mutation;
pub mod query;

pub use mutation::{create_user, delete_user, update_user};
pub use query::{get_user, get_users};
