//! Auth domain - credential codec, cookies and the login/logout resolvers
//!
//! Responsibilities:
//! - Signing and verifying identity credentials (JWT)
//! - Binding the verified identity into the request scope
//! - Rendering the credential cookie for the response sink
//! - Password digests for login

pub mod cookie;
pub mod data;
pub mod edges;
pub mod identity;
pub mod jwt;
pub mod password;

pub use cookie::{find_cookie, CredentialCookie, RequestCookie, ResponseCookie, SameSite};
pub use data::{LoginPayload, LoginReq, Viewer};
pub use identity::{current_credential, current_identity, CREDENTIAL, IDENTITY};
pub use jwt::{check_shape, Claims, CredentialCodec, CredentialError, Identity};

use std::sync::Arc;

/// Auth services shared by every request
#[derive(Clone)]
pub struct AuthServices {
    pub codec: Arc<CredentialCodec>,
    pub cookie: CredentialCookie,
}

impl AuthServices {
    pub fn new(codec: Arc<CredentialCodec>, cookie: CredentialCookie) -> Self {
        Self { codec, cookie }
    }
}
