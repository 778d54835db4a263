use crate::kernel::Scope;
use crate::server::app::AppState;
use crate::server::graphql::{Completion, GraphQLBody};
use axum::{
    extract::Extension,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};

/// GraphQL POST endpoint
///
/// One operation per request, executed inside one transaction.
pub async fn graphql_handler(
    Extension(state): Extension<AppState>,
    Extension(scope): Extension<Scope>,
    Json(body): Json<GraphQLBody>,
) -> Response {
    let output = state.executor.execute(&body, &scope).await;

    let status = match output.completion {
        Completion::Executed => StatusCode::OK,
        Completion::Rejected => StatusCode::BAD_REQUEST,
        Completion::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        Completion::CommitFailed => StatusCode::INTERNAL_SERVER_ERROR,
    };

    (status, Json(output.response)).into_response()
}

/// GraphQL playground (GraphiQL)
///
/// Sends cookies with every request so `login` sticks.
pub async fn graphql_playground() -> Html<&'static str> {
    Html(
        r#"
<!DOCTYPE html>
<html>
<head>
    <title>GraphQL Playground</title>
    <style>
        body {
            height: 100%;
            margin: 0;
            width: 100%;
            overflow: hidden;
        }
        #graphiql {
            height: 100vh;
        }
    </style>
    <script
        crossorigin
        src="https://unpkg.com/react@18/umd/react.production.min.js"
    ></script>
    <script
        crossorigin
        src="https://unpkg.com/react-dom@18/umd/react-dom.production.min.js"
    ></script>
    <link rel="stylesheet" href="https://unpkg.com/graphiql/graphiql.min.css" />
</head>
<body>
    <div id="graphiql">Loading...</div>
    <script
        src="https://unpkg.com/graphiql/graphiql.min.js"
        type="application/javascript"
    ></script>
    <script>
        const fetcher = GraphiQL.createFetcher({
            url: '/graphql',
            fetch: (input, init) => fetch(input, { ...init, credentials: 'include' }),
        });

        ReactDOM.render(
            React.createElement(GraphiQL, { fetcher: fetcher }),
            document.getElementById('graphiql'),
        );
    </script>
</body>
</html>
"#,
    )
}
