//! Credential cookie handling.
//!
//! Inbound: pull the named cookie out of a `Cookie` request header.
//! Outbound: render a `Set-Cookie` header value for the response sink.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SameSite {
    Strict,
    Lax,
    None,
}

impl fmt::Display for SameSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Strict => "Strict",
            Self::Lax => "Lax",
            Self::None => "None",
        })
    }
}

/// Cookie the client sent with the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestCookie {
    pub name: String,
    pub value: String,
}

/// Find `name` in a `Cookie` header value (`a=1; b=2`).
pub fn find_cookie(header: &str, name: &str) -> Option<RequestCookie> {
    header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| key.trim() == name)
        .map(|(key, value)| RequestCookie {
            name: key.trim().to_string(),
            value: value.trim().trim_matches('"').to_string(),
        })
}

/// Cookie a resolver wants written to the response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseCookie {
    pub name: String,
    pub value: String,
    pub path: String,
    pub max_age: Option<i64>,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl ResponseCookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            path: "/".to_string(),
            max_age: None,
            http_only: true,
            secure: false,
            same_site: SameSite::Lax,
        }
    }

    /// Cookie that makes the client drop `name`.
    pub fn removal(name: impl Into<String>) -> Self {
        Self::new(name, "").max_age(0)
    }

    pub fn max_age(mut self, seconds: i64) -> Self {
        self.max_age = Some(seconds);
        self
    }

    pub fn secure(mut self, secure: bool) -> Self {
        self.secure = secure;
        self
    }

    pub fn same_site(mut self, same_site: SameSite) -> Self {
        self.same_site = same_site;
        self
    }

    /// Render as a `Set-Cookie` header value.
    pub fn to_header_value(&self) -> String {
        let mut out = format!("{}={}; Path={}", self.name, self.value, self.path);
        if let Some(max_age) = self.max_age {
            out.push_str(&format!("; Max-Age={}", max_age));
        }
        if self.http_only {
            out.push_str("; HttpOnly");
        }
        if self.secure {
            out.push_str("; Secure");
        }
        out.push_str(&format!("; SameSite={}", self.same_site));
        out
    }
}

/// Settings for the cookie that carries the credential
#[derive(Debug, Clone)]
pub struct CredentialCookie {
    pub name: String,
    pub secure: bool,
    pub ttl: chrono::Duration,
}

impl CredentialCookie {
    pub fn new(name: impl Into<String>, secure: bool, ttl: chrono::Duration) -> Self {
        Self {
            name: name.into(),
            secure,
            ttl,
        }
    }

    /// Cookie carrying a freshly issued credential.
    pub fn issue(&self, credential: &str) -> ResponseCookie {
        ResponseCookie::new(&self.name, credential)
            .max_age(self.ttl.num_seconds())
            .secure(self.secure)
    }

    /// Cookie clearing the credential on the client.
    pub fn clear(&self) -> ResponseCookie {
        ResponseCookie::removal(&self.name).secure(self.secure)
    }
}
