//! Roles domain - named roles users can be linked to
//!
//! Roles carry no permissions here; deciding what a role allows is left to
//! the services consuming the identity.

pub mod data;
pub mod edges;
pub mod models;

pub use data::{CreateRoleInput, RoleData, UpdateRoleInput};
pub use edges::*;
pub use models::Role;
