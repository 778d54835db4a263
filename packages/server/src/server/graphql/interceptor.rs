//! Field-level authentication gate.
//!
//! Runs before every field resolved on a guarded object type. Only root
//! fields are gated; nested fields inherit whatever their root bound.

use std::sync::Arc;
use tracing::debug;

use super::directives::SchemaDirectives;
use crate::common::AuthError;
use crate::domains::auth::{CredentialCodec, CREDENTIAL, IDENTITY};
use crate::kernel::Scope;
use crate::server::middleware::INBOUND_COOKIE;

/// The field about to be resolved
#[derive(Debug, Clone, Copy)]
pub struct FieldVisit<'a> {
    pub operation_name: Option<&'a str>,
    pub object: &'a str,
    pub field: &'a str,
}

/// Why a field was let through without checking a credential
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bypass {
    /// `__schema`, `__type` or `__typename`; the operation name plays no part
    Introspection,
    NestedField,
    Directive,
}

#[derive(Debug)]
pub enum GateDecision {
    /// Resolve with the current scope
    Skip(Bypass),
    /// Resolve with this derived scope carrying the identity
    Authenticated(Scope),
}

/// Directive-driven authenticator
pub struct AuthInterceptor {
    codec: Arc<CredentialCodec>,
    directives: Arc<SchemaDirectives>,
    skip_auth_for: Vec<String>,
}

impl AuthInterceptor {
    pub fn new<I, T>(
        codec: Arc<CredentialCodec>,
        directives: Arc<SchemaDirectives>,
        skip_auth_for: I,
    ) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        Self {
            codec,
            directives,
            skip_auth_for: skip_auth_for.into_iter().map(Into::into).collect(),
        }
    }

    pub fn directives(&self) -> &SchemaDirectives {
        &self.directives
    }

    /// Decide whether `visit` may proceed and with which scope.
    pub fn intercept(
        &self,
        visit: &FieldVisit<'_>,
        scope: &Scope,
    ) -> Result<GateDecision, AuthError> {
        if is_introspection_field(visit.field) {
            return Ok(GateDecision::Skip(Bypass::Introspection));
        }

        if !self.directives.is_root_type(visit.object) {
            return Ok(GateDecision::Skip(Bypass::NestedField));
        }

        if self
            .directives
            .has_any(visit.object, visit.field, &self.skip_auth_for)
        {
            debug!(
                object = visit.object,
                field = visit.field,
                "Auth skipped by directive"
            );
            return Ok(GateDecision::Skip(Bypass::Directive));
        }

        let cookie = scope.get(&INBOUND_COOKIE).ok_or_else(|| {
            debug!(
                operation = visit.operation_name,
                object = visit.object,
                field = visit.field,
                "No credential cookie"
            );
            AuthError::MissingCredential
        })?;

        let identity = self.codec.parse(&cookie.value).map_err(|e| {
            debug!(
                object = visit.object,
                field = visit.field,
                error = %e,
                "Credential rejected"
            );
            AuthError::from(e)
        })?;

        debug!(
            object = visit.object,
            field = visit.field,
            user_id = identity.user_id(),
            "Field authenticated"
        );

        Ok(GateDecision::Authenticated(
            scope
                .with(&IDENTITY, identity)
                .with(&CREDENTIAL, cookie.clone()),
        ))
    }
}

/// Meta fields answered from the schema itself
fn is_introspection_field(field: &str) -> bool {
    matches!(field, "__schema" | "__type" | "__typename")
}
