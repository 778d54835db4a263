//! First-account bootstrap.
//!
//! Every mutation needs a credential and credentials only come from `login`,
//! so a fresh database has no way in. On startup the server makes sure the
//! configured admin account exists and holds the `admin` role.

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use super::models::{NewUser, User};
use crate::common::UserId;
use crate::domains::auth::password::hash_password;
use crate::domains::roles::models::Role;
use crate::domains::user_roles::models::UserRole;

/// Role linked to the bootstrap account
pub const ADMIN_ROLE: &str = "admin";

/// Audit actor for rows written before anyone has logged in
const SYSTEM_ACTOR: UserId = UserId::from_raw(0);

// Advisory lock key serialising concurrent server starts
const BOOTSTRAP_LOCK_KEY: i64 = 0x6361_735f_6164_6d6e;

/// Credentials of the account created on first start
#[derive(Debug, Clone)]
pub struct AdminAccount {
    pub name: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootstrapOutcome {
    Created(UserId),
    /// An active user already has the name; its password is left alone
    AlreadyPresent(UserId),
}

/// Create the admin account unless an active user already has its name.
pub async fn ensure_admin(pool: &PgPool, account: &AdminAccount) -> Result<BootstrapOutcome> {
    let mut tx = pool
        .begin()
        .await
        .context("Failed to open bootstrap transaction")?;
    sqlx::query("SELECT pg_advisory_xact_lock($1)")
        .bind(BOOTSTRAP_LOCK_KEY)
        .execute(&mut *tx)
        .await?;

    if let Some(existing) = User::find_by_name(&account.name, &mut *tx).await? {
        tx.rollback().await?;
        info!(user_id = %existing.id, "Bootstrap admin already present");
        return Ok(BootstrapOutcome::AlreadyPresent(existing.id));
    }

    let new_user = NewUser {
        name: account.name.clone(),
        phone: String::new(),
        password_hash: hash_password(&account.password)?,
    };
    let user = User::insert(&new_user, SYSTEM_ACTOR, &mut *tx).await?;

    let role = match Role::find_by_name(ADMIN_ROLE, &mut *tx).await? {
        Some(role) => role,
        None => Role::insert(ADMIN_ROLE, SYSTEM_ACTOR, &mut *tx).await?,
    };
    UserRole::link(user.id, role.id, SYSTEM_ACTOR, &mut *tx).await?;

    tx.commit()
        .await
        .context("Failed to commit bootstrap admin")?;

    info!(user_id = %user.id, name = %user.name, "Bootstrap admin created");
    Ok(BootstrapOutcome::Created(user.id))
}
