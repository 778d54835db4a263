//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header::CONTENT_TYPE, HeaderValue, Method},
    middleware,
    routing::{get, post},
    Router,
};
use sqlx::PgPool;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::config::Config;
use crate::domains::auth::{AuthServices, CredentialCodec, CredentialCookie};
use crate::kernel::{TransactionBoundary, TransactionOpener};
use crate::server::graphql::{create_schema, schema_directives, AuthInterceptor, OperationExecutor};
use crate::server::middleware::{request_scope_middleware, response_cookie_middleware};
use crate::server::routes::{graphql_handler, graphql_playground, health_handler};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub executor: OperationExecutor,
    /// Pool probed by the health check; absent when storage is not Postgres
    pub db_pool: Option<PgPool>,
}

/// Wire codec, interceptor, schema and transaction boundary.
pub fn build_executor(config: &Config, opener: Arc<dyn TransactionOpener>) -> OperationExecutor {
    let codec = Arc::new(
        CredentialCodec::new(&config.jwt_secret, config.jwt_issuer.clone())
            .with_ttl(config.token_ttl()),
    );
    let cookie = CredentialCookie::new(
        config.auth_cookie_name.clone(),
        config.cookie_secure,
        config.token_ttl(),
    );

    let interceptor = AuthInterceptor::new(
        codec.clone(),
        Arc::new(schema_directives()),
        config.skip_auth_directives.iter().cloned(),
    );
    let schema = Arc::new(create_schema(Arc::new(interceptor)));

    OperationExecutor::new(
        schema,
        TransactionBoundary::new(opener),
        Arc::new(AuthServices::new(codec, cookie)),
    )
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([CONTENT_TYPE]);

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    if origins.is_empty() {
        // Any origin, but browsers won't send the credential cookie
        cors.allow_origin(tower_http::cors::Any)
    } else {
        cors.allow_origin(AllowOrigin::list(origins))
            .allow_credentials(true)
    }
}

/// Build the router around an executor.
pub fn build_router(
    executor: OperationExecutor,
    config: &Config,
    db_pool: Option<PgPool>,
) -> Router {
    let state = AppState { executor, db_pool };
    let cookie_name: Arc<str> = Arc::from(config.auth_cookie_name.as_str());

    let mut router = Router::new().route("/graphql", post(graphql_handler));

    // GraphQL playground only in debug builds (development)
    #[cfg(debug_assertions)]
    {
        router = router.route("/graphql", get(graphql_playground));
    }

    router
        .route("/health", get(health_handler))
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            request_scope_middleware(cookie_name.clone(), req, next)
        })) // Root scope from the inbound cookie + sink
        .layer(middleware::from_fn(response_cookie_middleware)) // Sink, flushed into Set-Cookie
        .layer(Extension(state))
        .layer(cors_layer(&config.allowed_origins))
        .layer(TraceLayer::new_for_http())
}

/// Build the Axum application router over a Postgres pool
pub fn build_app(pool: PgPool, config: &Config) -> Router {
    let executor = build_executor(config, Arc::new(pool.clone()));
    build_router(executor, config, Some(pool))
}
