use axum::{
    extract::Request,
    http::{header::COOKIE, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::{debug, warn};

use super::response_cookie::{ResponseCookies, RESPONSE_COOKIES};
use crate::domains::auth::{find_cookie, RequestCookie};
use crate::kernel::{Scope, ScopeKey};

/// Scope slot holding the credential cookie sent with the request
pub const INBOUND_COOKIE: ScopeKey<RequestCookie> = ScopeKey::new("inbound_cookie");

/// Build the root scope for a request.
///
/// The response cookie sink is always bound; the inbound credential cookie
/// only when the client sent one.
pub fn request_scope(headers: &HeaderMap, cookie_name: &str, sink: ResponseCookies) -> Scope {
    let scope = Scope::root().with(&RESPONSE_COOKIES, sink);

    match extract_cookie(headers, cookie_name) {
        Some(cookie) => scope.with(&INBOUND_COOKIE, cookie),
        None => scope,
    }
}

/// Find the named cookie across all `Cookie` headers
fn extract_cookie(headers: &HeaderMap, cookie_name: &str) -> Option<RequestCookie> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .find_map(|header| find_cookie(header, cookie_name))
}

/// Request scope middleware
///
/// Reads the credential cookie and the response cookie sink installed by
/// `response_cookie_middleware`, and stores the resulting root `Scope` in
/// the request extensions for the GraphQL handler. Verification happens
/// later, per root field.
pub async fn request_scope_middleware(
    cookie_name: Arc<str>,
    mut request: Request,
    next: Next,
) -> Response {
    let sink = match request.extensions().get::<ResponseCookies>() {
        Some(sink) => sink.clone(),
        None => {
            warn!("Response cookie sink not installed; cookies set by resolvers will be dropped");
            ResponseCookies::new()
        }
    };

    let scope = request_scope(request.headers(), &cookie_name, sink);
    debug!(
        has_credential = scope.contains(&INBOUND_COOKIE),
        "Request scope created"
    );

    request.extensions_mut().insert(scope);
    next.run(request).await
}
