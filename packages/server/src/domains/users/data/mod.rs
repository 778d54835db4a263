//! User domain data types (GraphQL types)

pub mod user_types;

pub use user_types::{CreateUserInput, UpdateUserInput, UserData};
