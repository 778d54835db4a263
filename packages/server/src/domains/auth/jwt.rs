use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// JWT Claims - data stored in the credential
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    pub sub: String,  // Subject (user id as string)
    pub user_id: i64, // User primary key
    pub exp: i64,     // Expiration timestamp
    pub iat: i64,     // Issued at timestamp
    pub iss: String,  // Issuer
    pub jti: String,  // Unique credential id
}

/// Authenticated principal extracted from a verified credential
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Identity {
    user_id: i64,
}

impl Identity {
    pub fn new(user_id: i64) -> Self {
        Self { user_id }
    }

    pub fn user_id(&self) -> i64 {
        self.user_id
    }
}

#[derive(Error, Debug)]
pub enum CredentialError {
    #[error("credential is not a signed token")]
    Malformed,

    #[error("credential has expired")]
    Expired,

    #[error("credential signature does not match")]
    BadSignature,

    #[error("credential rejected: {0}")]
    Rejected(#[source] jsonwebtoken::errors::Error),

    #[error("failed to sign credential: {0}")]
    Signing(#[source] jsonwebtoken::errors::Error),
}

impl From<jsonwebtoken::errors::Error> for CredentialError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        match err.kind() {
            ErrorKind::ExpiredSignature => Self::Expired,
            ErrorKind::InvalidSignature => Self::BadSignature,
            ErrorKind::InvalidToken
            | ErrorKind::Base64(_)
            | ErrorKind::Json(_)
            | ErrorKind::Utf8(_) => Self::Malformed,
            _ => Self::Rejected(err),
        }
    }
}

/// Check that a raw credential looks like a compact JWS
/// (three non-empty base64url segments).
pub fn check_shape(raw: &str) -> Result<(), CredentialError> {
    let segments: Vec<&str> = raw.split('.').collect();
    if segments.len() != 3 {
        return Err(CredentialError::Malformed);
    }

    let well_formed = segments
        .iter()
        .all(|segment| !segment.is_empty() && URL_SAFE_NO_PAD.decode(segment).is_ok());

    if well_formed {
        Ok(())
    } else {
        Err(CredentialError::Malformed)
    }
}

/// Credential codec - signs and verifies identity tokens
///
/// Stateless after construction; safe to share across concurrent resolvers.
#[derive(Clone)]
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    ttl: chrono::Duration,
}

impl CredentialCodec {
    /// Create new codec with secret and issuer
    ///
    /// Credentials expire after 24 hours unless overridden with `with_ttl`.
    pub fn new(secret: &str, issuer: String) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            issuer,
            ttl: chrono::Duration::hours(24),
        }
    }

    pub fn with_ttl(mut self, ttl: chrono::Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn ttl(&self) -> chrono::Duration {
        self.ttl
    }

    /// Sign a new credential for a user
    pub fn issue(&self, user_id: i64) -> Result<String, CredentialError> {
        let now = chrono::Utc::now();
        let exp = now + self.ttl;

        let claims = Claims {
            sub: user_id.to_string(),
            user_id,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            iss: self.issuer.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(CredentialError::Signing)
    }

    /// Verify signature, issuer and expiry, returning the claims
    pub fn verify_claims(&self, raw: &str) -> Result<Claims, CredentialError> {
        check_shape(raw)?;

        let mut validation = Validation::default();
        validation.set_issuer(&[&self.issuer]);

        decode::<Claims>(raw, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(Into::into)
    }

    /// Map a raw credential to the identity it carries
    pub fn parse(&self, raw: &str) -> Result<Identity, CredentialError> {
        self.verify_claims(raw)
            .map(|claims| Identity::new(claims.user_id))
    }
}
