//! GraphQL edge resolvers for auth

pub mod mutation;
pub mod query;

pub use mutation::logout;
pub use query::{login, viewer};
