//! Runs one GraphQL operation inside its transaction.

use juniper::http::GraphQLResponse;
use juniper::{graphql_value, FieldError, Variables};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

use super::context::{GraphQLContext, OperationInfo};
use super::schema::Schema;
use crate::domains::auth::AuthServices;
use crate::kernel::{Outcome, Scope, TransactionBoundary};

/// Body of `POST /graphql`
#[derive(Debug, Clone, Deserialize)]
pub struct GraphQLBody {
    pub query: String,
    #[serde(rename = "operationName", default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Option<Variables>,
}

impl GraphQLBody {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            operation_name: None,
            variables: None,
        }
    }

    pub fn operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn variables(mut self, variables: Variables) -> Self {
        self.variables = Some(variables);
        self
    }
}

/// How an operation ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Completion {
    /// Resolvers ran. Committed if no field reported an error, else rolled back.
    Executed,
    /// The document failed to parse or validate; nothing ran
    Rejected,
    /// The transaction could not be opened; nothing ran
    Unavailable,
    /// Resolvers ran but the commit failed; their results are withheld
    CommitFailed,
}

pub struct OperationOutput {
    pub completion: Completion,
    pub response: GraphQLResponse,
}

impl OperationOutput {
    fn fatal(completion: Completion, message: &str, code: &str) -> Self {
        Self {
            completion,
            response: GraphQLResponse::error(FieldError::new(
                message,
                graphql_value!({ "code": code }),
            )),
        }
    }
}

/// Executes operations, one transaction each
#[derive(Clone)]
pub struct OperationExecutor {
    schema: Arc<Schema>,
    boundary: TransactionBoundary,
    auth: Arc<AuthServices>,
}

impl OperationExecutor {
    pub fn new(
        schema: Arc<Schema>,
        boundary: TransactionBoundary,
        auth: Arc<AuthServices>,
    ) -> Self {
        Self {
            schema,
            boundary,
            auth,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Run `body` against the request `scope`.
    ///
    /// Opens the transaction first; if that fails no resolver runs. The
    /// transaction is closed exactly once after execution.
    pub async fn execute(&self, body: &GraphQLBody, scope: &Scope) -> OperationOutput {
        let (scope, handle) = match self.boundary.begin(scope).await {
            Ok(opened) => opened,
            Err(e) => {
                error!(error = %e, "Operation aborted: transaction unavailable");
                return OperationOutput::fatal(
                    Completion::Unavailable,
                    "Storage unavailable",
                    "UNAVAILABLE",
                );
            }
        };

        let operation = OperationInfo::new(body.operation_name.clone());
        let context = GraphQLContext::new(scope, operation, self.auth.clone());
        let variables = body.variables.clone().unwrap_or_default();

        let result = juniper::execute(
            &body.query,
            body.operation_name.as_deref(),
            &self.schema,
            &variables,
            &context,
        )
        .await;

        let (completion, outcome) = match &result {
            Ok((_, errors)) if errors.is_empty() => (Completion::Executed, Outcome::Commit),
            Ok((_, errors)) => {
                debug!(errors = errors.len(), "Operation reported field errors");
                (Completion::Executed, Outcome::Rollback)
            }
            Err(e) => {
                debug!(error = %e, "Operation rejected");
                (Completion::Rejected, Outcome::Rollback)
            }
        };

        if let Err(e) = self.boundary.finish(&handle, outcome).await {
            if outcome == Outcome::Commit {
                error!(error = %e, "Operation results withheld: commit failed");
                return OperationOutput::fatal(
                    Completion::CommitFailed,
                    "Failed to commit operation",
                    "COMMIT_FAILED",
                );
            }
            // Nothing was kept either way; the connection is discarded.
            warn!(error = %e, "Rollback failed");
        }

        OperationOutput {
            completion,
            response: GraphQLResponse::from_result(result),
        }
    }
}
