//! Integration tests for user and role CRUD against Postgres.
//!
//! Tests critical paths:
//! - Create/update/delete users and roles with role links
//! - Nested queries across users, roles and links
//! - Audit columns taken from the authenticated caller
//! - Whole-operation rollback when any field fails
//! - Login issuing the credential cookie
//! - Startup bootstrap of the first admin account

mod common;

use axum::body::{to_bytes, Body};
use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
use axum::http::{Request, StatusCode};
use cas_core::domains::users::{ensure_admin, AdminAccount, BootstrapOutcome};
use common::{fixtures, GraphQLClient, TestHarness};
use serde_json::{json, Value};
use test_context::test_context;
use tower::ServiceExt;

// ============================================================================
// Test Helpers
// ============================================================================

/// Client authenticated as a freshly created user
async fn admin_client(ctx: &TestHarness) -> (GraphQLClient, String) {
    let admin = fixtures::create_test_user(
        &ctx.db_pool,
        &fixtures::unique_name("admin"),
        "secret123",
    )
    .await
    .unwrap();
    let client = ctx.graphql().authenticated(admin.id.raw());
    (client, admin.id.to_string())
}

async fn create_role(client: &GraphQLClient, name: &str) -> String {
    let data = client
        .query_with_vars(
            "mutation($name: String!) { createRole(input: { name: $name }) { id name } }",
            crate::vars!("name" => name.to_string()),
        )
        .await;
    assert_eq!(data["createRole"]["name"], json!(name));
    data["createRole"]["id"].as_str().unwrap().to_string()
}

fn sorted_names(list: &Value) -> Vec<String> {
    let mut names: Vec<String> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|item| item["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    names
}

// ============================================================================
// Roles
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn create_and_rename_role(ctx: &TestHarness) {
    let (client, admin_id) = admin_client(ctx).await;
    let name = fixtures::unique_name("editor");
    let role_id = create_role(&client, &name).await;

    let renamed = fixtures::unique_name("writer");
    let query = format!(
        r#"mutation {{ updateRole(id: "{}", input: {{ name: "{}" }}) {{ name createdBy updatedBy }} }}"#,
        role_id, renamed
    );
    let data = client.query(&query).await;

    assert_eq!(data["updateRole"]["name"], json!(renamed));
    assert_eq!(data["updateRole"]["createdBy"], json!(admin_id));
    assert_eq!(data["updateRole"]["updatedBy"], json!(admin_id));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn duplicate_role_name_is_rejected(ctx: &TestHarness) {
    let (client, _) = admin_client(ctx).await;
    let name = fixtures::unique_name("dup");
    create_role(&client, &name).await;

    let result = client
        .execute_with_vars(
            "mutation($name: String!) { createRole(input: { name: $name }) { id } }",
            crate::vars!("name" => name.clone()),
        )
        .await;

    assert!(!result.is_ok());
    assert_eq!(result.get("createRole"), Value::Null);
    assert_eq!(
        result.errors[0]["extensions"]["code"],
        json!("BAD_USER_INPUT")
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn missing_role_reports_not_found(ctx: &TestHarness) {
    let (client, _) = admin_client(ctx).await;

    let result = client
        .execute(r#"mutation { updateRole(id: "999999999", input: { name: "ghost" }) { id } }"#)
        .await;

    assert_eq!(result.errors[0]["extensions"]["code"], json!("NOT_FOUND"));

    let data = client.query(r#"{ role(id: "999999999") { id } }"#).await;
    assert_eq!(data["role"], Value::Null);
}

// ============================================================================
// Users and links
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn create_user_with_roles_and_query_nested(ctx: &TestHarness) {
    let (client, admin_id) = admin_client(ctx).await;
    let reader = fixtures::unique_name("reader");
    let writer = fixtures::unique_name("writer");
    let reader_id = create_role(&client, &reader).await;
    let writer_id = create_role(&client, &writer).await;

    let user_name = fixtures::unique_name("alice");
    let query = format!(
        r#"mutation {{
            createUser(input: {{ name: "{}", phone: "+15555550123", password: "hunter22", roleIds: ["{}", "{}"] }}) {{
                id name phone createdBy
                roles {{ name }}
                userRoles {{ roleId user {{ name }} }}
            }}
        }}"#,
        user_name, reader_id, writer_id
    );
    let data = client.query(&query).await;
    let user = &data["createUser"];

    assert_eq!(user["name"], json!(user_name));
    assert_eq!(user["phone"], json!("+15555550123"));
    assert_eq!(user["createdBy"], json!(admin_id));
    assert_eq!(sorted_names(&user["roles"]), {
        let mut expected = vec![reader.clone(), writer.clone()];
        expected.sort();
        expected
    });
    assert_eq!(user["userRoles"].as_array().unwrap().len(), 2);
    assert_eq!(user["userRoles"][0]["user"]["name"], json!(user_name));

    let user_id = user["id"].as_str().unwrap();
    let query = format!(
        r#"{{ role(id: "{}") {{ users {{ id }} userRoles {{ userId role {{ name }} }} }} }}"#,
        reader_id
    );
    let data = client.query(&query).await;

    assert_eq!(data["role"]["users"], json!([{ "id": user_id }]));
    assert_eq!(data["role"]["userRoles"][0]["role"]["name"], json!(reader));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn update_user_adds_and_removes_roles(ctx: &TestHarness) {
    let (client, _) = admin_client(ctx).await;
    let old_role = fixtures::create_test_role(&ctx.db_pool, &fixtures::unique_name("old"))
        .await
        .unwrap();
    let new_role = fixtures::create_test_role(&ctx.db_pool, &fixtures::unique_name("new"))
        .await
        .unwrap();
    let user = fixtures::create_test_user(
        &ctx.db_pool,
        &fixtures::unique_name("bob"),
        "secret123",
    )
    .await
    .unwrap();
    fixtures::link_user_role(&ctx.db_pool, user.id, old_role.id)
        .await
        .unwrap();

    let query = format!(
        r#"mutation {{
            updateUser(id: "{}", input: {{ phone: "+15555550999", addRoleIds: ["{}"], removeRoleIds: ["{}"] }}) {{
                name phone roles {{ name }}
            }}
        }}"#,
        user.id, new_role.id, old_role.id
    );
    let data = client.query(&query).await;

    assert_eq!(data["updateUser"]["name"], json!(user.name));
    assert_eq!(data["updateUser"]["phone"], json!("+15555550999"));
    assert_eq!(data["updateUser"]["roles"], json!([{ "name": new_role.name }]));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn deleted_user_disappears(ctx: &TestHarness) {
    let (client, _) = admin_client(ctx).await;
    let role = fixtures::create_test_role(&ctx.db_pool, &fixtures::unique_name("temp"))
        .await
        .unwrap();
    let user = fixtures::create_test_user(
        &ctx.db_pool,
        &fixtures::unique_name("carol"),
        "secret123",
    )
    .await
    .unwrap();
    fixtures::link_user_role(&ctx.db_pool, user.id, role.id)
        .await
        .unwrap();

    let data = client
        .query(&format!(r#"mutation {{ deleteUser(id: "{}") }}"#, user.id))
        .await;
    assert_eq!(data["deleteUser"], json!(true));

    let data = client
        .query(&format!(
            r#"{{ user(id: "{}") {{ id }} role(id: "{}") {{ users {{ id }} }} }}"#,
            user.id, role.id
        ))
        .await;
    assert_eq!(data["user"], Value::Null);
    assert_eq!(data["role"]["users"], json!([]));

    let data = client.query("{ users { id } }").await;
    let ids: Vec<&str> = data["users"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|u| u["id"].as_str())
        .collect();
    assert!(!ids.contains(&user.id.to_string().as_str()));

    // Deleting again finds nothing
    let result = client
        .execute(&format!(r#"mutation {{ deleteUser(id: "{}") }}"#, user.id))
        .await;
    assert_eq!(result.errors[0]["extensions"]["code"], json!("NOT_FOUND"));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn deleted_name_can_be_reused(ctx: &TestHarness) {
    let (client, _) = admin_client(ctx).await;
    let name = fixtures::unique_name("reuse");
    let role_id = create_role(&client, &name).await;

    client
        .query(&format!(r#"mutation {{ deleteRole(id: "{}") }}"#, role_id))
        .await;
    let new_id = create_role(&client, &name).await;

    assert_ne!(new_id, role_id);
}

#[test_context(TestHarness)]
#[tokio::test]
async fn short_password_is_rejected(ctx: &TestHarness) {
    let (client, _) = admin_client(ctx).await;

    let result = client
        .execute(r#"mutation { createUser(input: { name: "shorty", password: "abc" }) { id } }"#)
        .await;

    assert_eq!(
        result.errors[0]["extensions"]["code"],
        json!("BAD_USER_INPUT")
    );
}

// ============================================================================
// Rollback
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn failing_field_rolls_back_earlier_mutations(ctx: &TestHarness) {
    let (client, _) = admin_client(ctx).await;
    let name = fixtures::unique_name("doomed");

    let query = format!(
        r#"mutation {{
            first: createRole(input: {{ name: "{}" }}) {{ id }}
            second: createRole(input: {{ name: "   " }}) {{ id }}
        }}"#,
        name
    );
    let result = client.execute(&query).await;

    // The first field resolved, but its write was rolled back
    assert!(result.get("first.id").is_string());
    assert!(result.error_at("second").is_some());
    assert!(fixtures::find_role_by_name(&ctx.db_pool, &name)
        .await
        .unwrap()
        .is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn unknown_role_id_rolls_back_user_creation(ctx: &TestHarness) {
    let (client, _) = admin_client(ctx).await;
    let name = fixtures::unique_name("orphan");

    let query = format!(
        r#"mutation {{ createUser(input: {{ name: "{}", password: "secret123", roleIds: ["999999999"] }}) {{ id }} }}"#,
        name
    );
    let result = client.execute(&query).await;
    assert_eq!(result.errors[0]["extensions"]["code"], json!("NOT_FOUND"));

    // The user row went with the rollback, so it can't log in
    let login = client
        .execute_with_vars(
            "query($name: String!) { login(req: { name: $name, password: \"secret123\" }) { expiresAt } }",
            crate::vars!("name" => name.clone()),
        )
        .await;
    assert_eq!(login.get("login"), Value::Null);
    assert_eq!(
        login.errors[0]["extensions"]["reason"],
        json!("invalid_login")
    );
}

#[test_context(TestHarness)]
#[tokio::test]
async fn anonymous_mutation_writes_nothing(ctx: &TestHarness) {
    let name = fixtures::unique_name("anon");

    let result = ctx
        .graphql()
        .execute_with_vars(
            "mutation($name: String!) { createRole(input: { name: $name }) { id } }",
            crate::vars!("name" => name.clone()),
        )
        .await;

    assert_eq!(
        result.errors[0]["extensions"]["reason"],
        json!("missing_credential")
    );
    assert!(fixtures::find_role_by_name(&ctx.db_pool, &name)
        .await
        .unwrap()
        .is_none());
}

// ============================================================================
// Login
// ============================================================================

#[test_context(TestHarness)]
#[tokio::test]
async fn login_cookie_authenticates_viewer(ctx: &TestHarness) {
    let name = fixtures::unique_name("dave");
    let user = fixtures::create_test_user(&ctx.db_pool, &name, "correct-horse")
        .await
        .unwrap();

    let result = ctx
        .graphql()
        .execute_with_vars(
            "query($name: String!) { login(req: { name: $name, password: \"correct-horse\" }) { user { id name } expiresAt } }",
            crate::vars!("name" => name.clone()),
        )
        .await;

    assert!(result.is_ok(), "errors: {:?}", result.errors);
    assert_eq!(result.get("login.user.id"), json!(user.id.to_string()));
    let cookie = result.set_cookie.expect("login should set the credential cookie");
    assert_eq!(cookie.name, "token");
    assert!(cookie.max_age.unwrap() > 0);

    let data = ctx
        .graphql()
        .with_cookie(cookie.value)
        .query("{ viewer { userId user { name } } }")
        .await;

    assert_eq!(data["viewer"]["userId"], json!(user.id.to_string()));
    assert_eq!(data["viewer"]["user"]["name"], json!(name));
}

#[test_context(TestHarness)]
#[tokio::test]
async fn wrong_password_sets_no_cookie(ctx: &TestHarness) {
    let name = fixtures::unique_name("erin");
    fixtures::create_test_user(&ctx.db_pool, &name, "correct-horse")
        .await
        .unwrap();

    let result = ctx
        .graphql()
        .execute_with_vars(
            "query($name: String!) { login(req: { name: $name, password: \"battery-staple\" }) { expiresAt } }",
            crate::vars!("name" => name.clone()),
        )
        .await;

    assert_eq!(result.get("login"), Value::Null);
    assert_eq!(
        result.errors[0]["extensions"]["reason"],
        json!("invalid_login")
    );
    assert!(result.set_cookie.is_none());
}

#[test_context(TestHarness)]
#[tokio::test]
async fn http_login_round_trip(ctx: &TestHarness) {
    let name = fixtures::unique_name("frank");
    fixtures::create_test_user(&ctx.db_pool, &name, "correct-horse")
        .await
        .unwrap();

    let login = json!({
        "query": "query($name: String!) { login(req: { name: $name, password: \"correct-horse\" }) { user { name } } }",
        "variables": { "name": name },
    });
    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from(login.to_string()))
        .unwrap();
    let response = ctx.app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(SET_COOKIE)
        .expect("login should set the cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.contains("HttpOnly"));
    let pair = set_cookie.split(';').next().unwrap().to_string();

    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(CONTENT_TYPE, "application/json")
        .header(COOKIE, pair)
        .body(Body::from(
            json!({ "query": "{ viewer { user { name } } }" }).to_string(),
        ))
        .unwrap();
    let response = ctx.app().oneshot(request).await.unwrap();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(body["data"]["viewer"]["user"]["name"], json!(name));
}

// ============================================================================
// Bootstrap
// ============================================================================

const LOGIN: &str = "query($name: String!, $password: String!) { \
    login(req: { name: $name, password: $password }) { user { id } } }";

#[test_context(TestHarness)]
#[tokio::test]
async fn bootstrap_admin_is_created_once(ctx: &TestHarness) {
    let account = AdminAccount {
        name: fixtures::unique_name("root"),
        password: "first-password".to_string(),
    };

    let created = ensure_admin(&ctx.db_pool, &account).await.unwrap();
    let BootstrapOutcome::Created(admin_id) = created else {
        panic!("expected a new account, got {:?}", created);
    };

    // The bootstrap account can log in and reach protected fields
    let login = ctx
        .graphql()
        .execute_with_vars(
            LOGIN,
            crate::vars!(
                "name" => account.name.clone(),
                "password" => account.password.clone(),
            ),
        )
        .await;
    assert!(login.is_ok(), "errors: {:?}", login.errors);
    let cookie = login.set_cookie.expect("login should set the cookie");

    let query = format!(r#"{{ user(id: "{}") {{ roles {{ name }} }} }}"#, admin_id);
    let data = ctx.graphql().with_cookie(cookie.value).query(&query).await;
    assert_eq!(data["user"]["roles"], json!([{ "name": "admin" }]));

    // A second start leaves the existing account untouched
    let again = AdminAccount {
        password: "second-password".to_string(),
        ..account.clone()
    };
    let outcome = ensure_admin(&ctx.db_pool, &again).await.unwrap();
    assert_eq!(outcome, BootstrapOutcome::AlreadyPresent(admin_id));

    let relogin = ctx
        .graphql()
        .execute_with_vars(
            LOGIN,
            crate::vars!(
                "name" => again.name.clone(),
                "password" => again.password.clone(),
            ),
        )
        .await;
    assert_eq!(relogin.get("login"), Value::Null);
    assert!(relogin.set_cookie.is_none());
}
