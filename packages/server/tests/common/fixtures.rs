//! Test fixtures for creating test data.
//!
//! These fixtures use the model methods directly to create test data.

use anyhow::Result;
use cas_core::common::{RoleId, UserId};
use cas_core::domains::auth::password::hash_password_with_cost;
use cas_core::domains::roles::models::Role;
use cas_core::domains::user_roles::models::UserRole;
use cas_core::domains::users::models::{NewUser, User};
use sqlx::PgPool;
use uuid::Uuid;

/// Actor recorded on fixture rows
pub const FIXTURE_ACTOR: UserId = UserId::from_raw(0);

/// bcrypt's minimum cost keeps fixture setup fast
const FIXTURE_BCRYPT_COST: u32 = 4;

/// Name unique across the shared test database
pub fn unique_name(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

pub async fn create_test_user(pool: &PgPool, name: &str, password: &str) -> Result<User> {
    let mut conn = pool.acquire().await?;
    let new_user = NewUser {
        name: name.to_string(),
        phone: "+15555550100".to_string(),
        password_hash: hash_password_with_cost(password, FIXTURE_BCRYPT_COST)?,
    };
    User::insert(&new_user, FIXTURE_ACTOR, &mut conn).await
}

pub async fn create_test_role(pool: &PgPool, name: &str) -> Result<Role> {
    let mut conn = pool.acquire().await?;
    Role::insert(name, FIXTURE_ACTOR, &mut conn).await
}

pub async fn link_user_role(pool: &PgPool, user_id: UserId, role_id: RoleId) -> Result<()> {
    let mut conn = pool.acquire().await?;
    UserRole::link(user_id, role_id, FIXTURE_ACTOR, &mut conn).await?;
    Ok(())
}

pub async fn find_role_by_name(pool: &PgPool, name: &str) -> Result<Option<Role>> {
    let mut conn = pool.acquire().await?;
    Role::find_by_name(name, &mut conn).await
}
