// Common test utilities
#![allow(dead_code)]

pub mod fixtures;
pub mod graphql;
pub mod harness;

pub use fixtures::*;
pub use graphql::*;
pub use harness::*;

use cas_core::Config;

/// Configuration shared by every test client
pub fn test_config() -> Config {
    Config::from_lookup(|key| {
        let value = match key {
            "DATABASE_URL" => "postgres://unused",
            "JWT_SECRET" => "test_secret_key",
            "JWT_ISSUER" => "test_issuer",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("test config")
}

/// Macro for creating GraphQL variables
#[macro_export]
macro_rules! vars {
    ($($key:expr => $value:expr),* $(,)?) => {{
        let mut vars = juniper::Variables::new();
        $(
            vars.insert(
                $key.to_string(),
                juniper::InputValue::scalar($value),
            );
        )*
        vars
    }};
}
