// Common types and utilities shared across the application

pub mod auth;
pub mod entity_ids;
pub mod field_errors;
pub mod id;

pub use auth::AuthError;
pub use entity_ids::*;
pub use field_errors::{bad_input, internal_error, not_found, to_field_error};
