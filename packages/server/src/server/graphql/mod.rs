// GraphQL schema, context and the field gate
pub mod context;
pub mod directives;
pub mod guard;
pub mod interceptor;
pub mod operation;
pub mod schema;

pub use context::*;
pub use directives::{schema_directives, SchemaDirectives, SKIP_AUTH};
pub use guard::Guarded;
pub use interceptor::{AuthInterceptor, Bypass, FieldVisit, GateDecision};
pub use operation::{Completion, GraphQLBody, OperationExecutor, OperationOutput};
pub use schema::*;
