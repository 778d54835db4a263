// CAS - users, roles and authenticated GraphQL access
//
// Every GraphQL operation runs in one database transaction; root fields are
// gated by a cookie-borne credential unless the schema marks them public.

pub mod common;
pub mod config;
pub mod domains;
pub mod kernel;
pub mod server;

pub use config::*;
