use juniper::{graphql_value, FieldError, IntoFieldError};
use thiserror::Error;

use crate::domains::auth::CredentialError;

/// Authentication failures raised by the field gate
#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Authentication required: no credential cookie")]
    MissingCredential,

    #[error("Malformed credential cookie")]
    MalformedCredential,

    #[error("Invalid credential: {0}")]
    InvalidCredential(#[source] CredentialError),
}

impl AuthError {
    /// Machine-readable reason reported in `extensions.reason`.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::MissingCredential => "missing_credential",
            Self::MalformedCredential => "malformed_credential",
            Self::InvalidCredential(_) => "invalid_credential",
        }
    }
}

impl From<CredentialError> for AuthError {
    fn from(err: CredentialError) -> Self {
        match err {
            CredentialError::Malformed => Self::MalformedCredential,
            other => Self::InvalidCredential(other),
        }
    }
}

impl IntoFieldError for AuthError {
    fn into_field_error(self) -> FieldError {
        let extensions = match &self {
            Self::MissingCredential => graphql_value!({
                "code": "UNAUTHENTICATED",
                "reason": "missing_credential"
            }),
            Self::MalformedCredential => graphql_value!({
                "code": "UNAUTHENTICATED",
                "reason": "malformed_credential"
            }),
            Self::InvalidCredential(_) => graphql_value!({
                "code": "UNAUTHENTICATED",
                "reason": "invalid_credential"
            }),
        };
        FieldError::new(self, extensions)
    }
}
