//! User/role links
//!
//! Links are maintained through the user mutations; this domain only
//! persists them and exposes them as `UserRole`.

pub mod data;
pub mod models;

pub use data::UserRoleData;
pub use models::UserRole;
