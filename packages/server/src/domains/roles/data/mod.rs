//! Role domain data types (GraphQL types)

pub mod role_types;

pub use role_types::{CreateRoleInput, RoleData, UpdateRoleInput};
