//! GraphQL client for integration testing.
//!
//! Executes operations through the same executor the HTTP handler uses
//! (transaction boundary, field gate) without HTTP overhead.

use axum::http::{header::COOKIE, HeaderMap, HeaderValue};
use cas_core::domains::auth::{CredentialCodec, ResponseCookie};
use cas_core::server::graphql::{Completion, GraphQLBody, OperationExecutor};
use cas_core::server::middleware::{request_scope, ResponseCookies};
use cas_core::Config;
use juniper::Variables;
use serde_json::Value;

/// GraphQL client for executing queries and mutations in tests.
#[derive(Clone)]
pub struct GraphQLClient {
    executor: OperationExecutor,
    codec: CredentialCodec,
    cookie_name: String,
    cookie: Option<String>,
}

/// Result of a GraphQL execution.
#[derive(Debug)]
pub struct GraphQLResult {
    pub completion: Completion,
    pub data: Value,
    pub errors: Vec<Value>,
    /// Cookie left in the response sink by the resolvers
    pub set_cookie: Option<ResponseCookie>,
}

impl GraphQLResult {
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Unwraps the data, panicking if there were errors.
    pub fn unwrap(self) -> Value {
        if !self.errors.is_empty() {
            panic!("GraphQL errors: {:?}", self.errors);
        }
        self.data
    }

    /// Gets a value at the given dotted path.
    pub fn get(&self, path: &str) -> Value {
        let mut current = &self.data;
        for key in path.split('.') {
            current = &current[key];
        }
        current.clone()
    }

    pub fn error_messages(&self) -> Vec<String> {
        self.errors
            .iter()
            .map(|e| e["message"].as_str().unwrap_or_default().to_string())
            .collect()
    }

    /// The error reported at `path` (root field name), if any
    pub fn error_at(&self, field: &str) -> Option<&Value> {
        self.errors.iter().find(|e| e["path"][0] == field)
    }
}

impl GraphQLClient {
    pub fn new(executor: OperationExecutor, config: &Config) -> Self {
        let codec = CredentialCodec::new(&config.jwt_secret, config.jwt_issuer.clone())
            .with_ttl(config.token_ttl());
        Self {
            executor,
            codec,
            cookie_name: config.auth_cookie_name.clone(),
            cookie: None,
        }
    }

    /// Same client sending a credential cookie for `user_id`.
    pub fn authenticated(&self, user_id: i64) -> Self {
        let token = self.codec.issue(user_id).expect("Failed to issue credential");
        self.with_cookie(token)
    }

    /// Same client sending an arbitrary cookie value.
    pub fn with_cookie(&self, value: impl Into<String>) -> Self {
        Self {
            cookie: Some(value.into()),
            ..self.clone()
        }
    }

    pub fn codec(&self) -> &CredentialCodec {
        &self.codec
    }

    /// Execute a GraphQL query/mutation.
    pub async fn execute(&self, query: &str) -> GraphQLResult {
        self.run(GraphQLBody::new(query)).await
    }

    /// Execute a GraphQL query/mutation with variables.
    pub async fn execute_with_vars(&self, query: &str, variables: Variables) -> GraphQLResult {
        self.run(GraphQLBody::new(query).variables(variables)).await
    }

    /// Execute a full request body.
    pub async fn run(&self, body: GraphQLBody) -> GraphQLResult {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &self.cookie {
            let header = format!("{}={}", self.cookie_name, cookie);
            headers.insert(COOKIE, HeaderValue::from_str(&header).expect("valid cookie header"));
        }

        let sink = ResponseCookies::new();
        let scope = request_scope(&headers, &self.cookie_name, sink.clone());
        let output = self.executor.execute(&body, &scope).await;

        let json = serde_json::to_value(&output.response).expect("Failed to serialize response");
        let errors = json["errors"].as_array().cloned().unwrap_or_default();

        GraphQLResult {
            completion: output.completion,
            data: json["data"].clone(),
            errors,
            set_cookie: sink.take(),
        }
    }

    /// Execute a query and expect success, returning the data.
    pub async fn query(&self, query: &str) -> Value {
        self.execute(query).await.unwrap()
    }

    /// Execute a query with variables and expect success.
    pub async fn query_with_vars(&self, query: &str, variables: Variables) -> Value {
        self.execute_with_vars(query, variables).await.unwrap()
    }
}
