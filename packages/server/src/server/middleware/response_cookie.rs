use axum::{
    extract::Request,
    http::{header::SET_COOKIE, HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::domains::auth::ResponseCookie;
use crate::kernel::{Scope, ScopeKey};

/// Scope slot holding the request's response cookie sink
pub const RESPONSE_COOKIES: ScopeKey<ResponseCookies> = ScopeKey::new("response_cookies");

/// Pending response cookie for one request
///
/// Resolvers write into the sink through the scope; the middleware flushes
/// it into the response headers once, before the body is sent. At most one
/// cookie is pending and the last write wins.
#[derive(Clone, Default)]
pub struct ResponseCookies {
    pending: Arc<Mutex<Option<ResponseCookie>>>,
}

impl ResponseCookies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&self, cookie: ResponseCookie) {
        if let Some(previous) = self.lock().replace(cookie) {
            debug!(cookie = %previous.name, "Replacing pending response cookie");
        }
    }

    pub fn is_pending(&self) -> bool {
        self.lock().is_some()
    }

    /// Remove the pending cookie, leaving the sink empty.
    pub fn take(&self) -> Option<ResponseCookie> {
        self.lock().take()
    }

    /// Write the pending cookie as a `Set-Cookie` header and clear it.
    ///
    /// Returns whether a header was written.
    pub fn flush_into(&self, headers: &mut HeaderMap) -> bool {
        let Some(cookie) = self.take() else {
            return false;
        };

        match HeaderValue::from_str(&cookie.to_header_value()) {
            Ok(value) => {
                headers.append(SET_COOKIE, value);
                true
            }
            Err(e) => {
                warn!(cookie = %cookie.name, error = %e, "Dropping unencodable response cookie");
                false
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, Option<ResponseCookie>> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Request a cookie on the response of the request owning `scope`.
///
/// Returns false if no sink is installed for this request.
pub fn set_response_cookie(scope: &Scope, cookie: ResponseCookie) -> bool {
    match scope.get(&RESPONSE_COOKIES) {
        Some(sink) => {
            sink.set(cookie);
            true
        }
        None => {
            warn!(cookie = %cookie.name, "No response cookie sink in scope");
            false
        }
    }
}

/// Response cookie middleware
///
/// Installs an empty sink in the request extensions and, once the inner
/// handler has produced a response, flushes any pending cookie into its
/// headers.
pub async fn response_cookie_middleware(mut request: Request, next: Next) -> Response {
    let sink = ResponseCookies::new();
    request.extensions_mut().insert(sink.clone());

    let mut response = next.run(request).await;

    if sink.flush_into(response.headers_mut()) {
        debug!("Response cookie written");
    }

    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flush_writes_once() {
        let sink = ResponseCookies::new();
        sink.set(ResponseCookie::new("token", "abc"));

        let mut headers = HeaderMap::new();
        assert!(sink.flush_into(&mut headers));
        assert!(!sink.flush_into(&mut headers));

        assert_eq!(headers.get_all(SET_COOKIE).iter().count(), 1);
    }

    #[test]
    fn test_flush_without_cookie_writes_nothing() {
        let sink = ResponseCookies::new();
        let mut headers = HeaderMap::new();

        assert!(!sink.flush_into(&mut headers));
        assert!(headers.get(SET_COOKIE).is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let sink = ResponseCookies::new();
        sink.set(ResponseCookie::new("token", "first"));
        sink.set(ResponseCookie::new("token", "second"));

        assert_eq!(sink.take().unwrap().value, "second");
        assert!(!sink.is_pending());
    }

    #[test]
    fn test_set_through_scope_reaches_shared_sink() {
        let sink = ResponseCookies::new();
        let scope = Scope::root().with(&RESPONSE_COOKIES, sink.clone());
        let child = scope.with(
            &crate::domains::auth::IDENTITY,
            crate::domains::auth::Identity::new(1),
        );

        assert!(set_response_cookie(&child, ResponseCookie::new("token", "abc")));
        assert!(sink.is_pending());
    }

    #[test]
    fn test_set_without_sink() {
        assert!(!set_response_cookie(
            &Scope::root(),
            ResponseCookie::new("token", "abc")
        ));
    }
}
