//! GraphQL edge resolvers for roles

pub mod mutation;
pub mod query;

pub use mutation::{create_role, delete_role, update_role};
pub use query::{get_role, get_roles};
