/// Authentication error taxonomy shared by the GraphQL gate and resolvers.
///
/// Only "is the caller authenticated" is decided here; what an identity is
/// allowed to do is left to the resolvers that consume it.
mod errors;

pub use errors::AuthError;
