use juniper::{FieldError, FieldResult};
use std::sync::Arc;

use crate::common::{internal_error, AuthError, UserId};
use crate::domains::auth::{
    current_credential, current_identity, AuthServices, Identity, RequestCookie, ResponseCookie,
};
use crate::kernel::{current_transaction, Scope, TransactionGuard, TransactionHandle};
use crate::server::middleware::set_response_cookie;

/// Facts about the operation being executed
#[derive(Debug, Clone, Default)]
pub struct OperationInfo {
    name: Option<String>,
}

impl OperationInfo {
    pub fn new(name: Option<String>) -> Self {
        Self { name }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}

/// GraphQL request context
///
/// Immutable: the field gate derives a new context with a child scope
/// instead of mutating this one, so concurrently resolved siblings never
/// see each other's bindings.
#[derive(Clone)]
pub struct GraphQLContext {
    scope: Scope,
    operation: Arc<OperationInfo>,
    auth: Arc<AuthServices>,
}

impl juniper::Context for GraphQLContext {}

impl GraphQLContext {
    pub fn new(scope: Scope, operation: OperationInfo, auth: Arc<AuthServices>) -> Self {
        Self {
            scope,
            operation: Arc::new(operation),
            auth,
        }
    }

    /// Same operation and services, different scope
    pub fn derive(&self, scope: Scope) -> Self {
        Self {
            scope,
            operation: self.operation.clone(),
            auth: self.auth.clone(),
        }
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn operation(&self) -> &OperationInfo {
        &self.operation
    }

    pub fn auth(&self) -> &AuthServices {
        &self.auth
    }

    /// Identity bound by the gate, if this field's root was authenticated
    pub fn identity(&self) -> Option<&Identity> {
        current_identity(&self.scope)
    }

    /// Identity or a missing-credential error
    pub fn require_identity(&self) -> FieldResult<&Identity> {
        self.identity()
            .ok_or_else(|| juniper::IntoFieldError::into_field_error(AuthError::MissingCredential))
    }

    /// User recorded in audit columns; 0 when anonymous
    pub fn actor(&self) -> UserId {
        UserId::from_raw(self.identity().map(Identity::user_id).unwrap_or(0))
    }

    /// Verified credential cookie, for forwarding to downstream services
    pub fn credential(&self) -> Option<&RequestCookie> {
        current_credential(&self.scope)
    }

    /// The operation's transaction
    ///
    /// Always present when the operation runs through the transaction
    /// boundary; absence is a wiring bug and is reported as internal.
    pub fn transaction(&self) -> FieldResult<&TransactionHandle> {
        current_transaction(&self.scope).map_err(internal_error)
    }

    /// Exclusive use of the operation's transaction until the guard drops
    pub async fn lock_transaction(&self) -> FieldResult<TransactionGuard<'_>> {
        Ok(self.transaction()?.lock().await)
    }

    /// Ask for a cookie on this request's response (last write wins)
    pub fn set_response_cookie(&self, cookie: ResponseCookie) -> FieldResult<()> {
        if set_response_cookie(&self.scope, cookie) {
            Ok(())
        } else {
            Err(FieldError::new(
                "Response cookies are not available for this request",
                juniper::Value::null(),
            ))
        }
    }
}
