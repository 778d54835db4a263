use juniper::{graphql_value, FieldError};
use std::fmt::Display;
use tracing::error;

/// Convert a domain failure into a field error carrying its message
pub fn to_field_error(e: impl Display) -> FieldError {
    FieldError::new(e.to_string(), juniper::Value::null())
}

/// Rejected client input
pub fn bad_input(message: impl Display) -> FieldError {
    FieldError::new(
        message.to_string(),
        graphql_value!({ "code": "BAD_USER_INPUT" }),
    )
}

pub fn not_found(what: &str, id: impl Display) -> FieldError {
    FieldError::new(
        format!("{} {} not found", what, id),
        graphql_value!({ "code": "NOT_FOUND" }),
    )
}

/// Log an infrastructure failure and report an opaque field error
pub fn internal_error(e: impl Display) -> FieldError {
    error!(error = %e, "Resolver failed");
    FieldError::new(
        "Internal server error",
        graphql_value!({ "code": "INTERNAL" }),
    )
}
