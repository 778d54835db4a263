use super::cookie::RequestCookie;
use super::jwt::Identity;
use crate::kernel::{Scope, ScopeKey};

/// Identity bound by the field gate after the credential verified
pub const IDENTITY: ScopeKey<Identity> = ScopeKey::new("identity");

/// Verified credential cookie, kept for calls to downstream services
pub const CREDENTIAL: ScopeKey<RequestCookie> = ScopeKey::new("credential");

pub fn current_identity(scope: &Scope) -> Option<&Identity> {
    scope.get(&IDENTITY)
}

pub fn current_credential(scope: &Scope) -> Option<&RequestCookie> {
    scope.get(&CREDENTIAL)
}
