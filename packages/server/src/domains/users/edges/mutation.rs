//! GraphQL mutation resolvers for users

use juniper::{FieldResult, ID};
use sqlx::PgConnection;
use tracing::info;

use crate::common::{bad_input, internal_error, not_found, RoleId, UserId};
use crate::domains::auth::password::{hash_password, MIN_PASSWORD_LEN};
use crate::domains::roles::models::Role;
use crate::domains::user_roles::models::UserRole;
use crate::domains::users::data::{CreateUserInput, UpdateUserInput, UserData};
use crate::domains::users::models::{NewUser, User, UserChanges};
use crate::server::graphql::context::GraphQLContext;

fn validate_name(name: &str) -> FieldResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(bad_input("Name must not be empty"));
    }
    Ok(name.to_string())
}

fn validate_password(password: &str) -> FieldResult<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(bad_input(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LEN
        )));
    }
    Ok(())
}

fn parse_role_ids(ids: Option<&Vec<ID>>) -> FieldResult<Vec<RoleId>> {
    ids.into_iter().flatten().map(RoleId::try_from).collect()
}

async fn ensure_name_free(
    name: &str,
    except: Option<UserId>,
    conn: &mut PgConnection,
) -> FieldResult<()> {
    let existing = User::find_by_name(name, conn)
        .await
        .map_err(internal_error)?;

    match existing {
        Some(user) if Some(user.id) != except => {
            Err(bad_input(format!("User name '{}' is already taken", name)))
        }
        _ => Ok(()),
    }
}

async fn link_roles(
    user_id: UserId,
    role_ids: &[RoleId],
    actor: UserId,
    conn: &mut PgConnection,
) -> FieldResult<()> {
    for &role_id in role_ids {
        if Role::find_by_id(role_id, conn)
            .await
            .map_err(internal_error)?
            .is_none()
        {
            return Err(not_found("Role", role_id));
        }
        UserRole::link(user_id, role_id, actor, conn)
            .await
            .map_err(internal_error)?;
    }
    Ok(())
}

pub async fn create_user(ctx: &GraphQLContext, input: CreateUserInput) -> FieldResult<UserData> {
    let name = validate_name(&input.name)?;
    validate_password(&input.password)?;
    let role_ids = parse_role_ids(input.role_ids.as_ref())?;
    let actor = ctx.actor();

    let mut tx = ctx.lock_transaction().await?;
    let conn = tx.connection().map_err(internal_error)?;

    ensure_name_free(&name, None, conn).await?;

    let new_user = NewUser {
        name,
        phone: input.phone.unwrap_or_default(),
        password_hash: hash_password(&input.password).map_err(internal_error)?,
    };
    let user = User::insert(&new_user, actor, conn)
        .await
        .map_err(internal_error)?;

    link_roles(user.id, &role_ids, actor, conn).await?;

    info!(user_id = %user.id, actor = %actor, roles = role_ids.len(), "User created");
    Ok(UserData::from(user))
}

pub async fn update_user(
    ctx: &GraphQLContext,
    id: ID,
    input: UpdateUserInput,
) -> FieldResult<UserData> {
    let user_id = UserId::try_from(&id)?;
    let name = input.name.as_deref().map(validate_name).transpose()?;
    if let Some(password) = &input.password {
        validate_password(password)?;
    }
    let add_role_ids = parse_role_ids(input.add_role_ids.as_ref())?;
    let remove_role_ids = parse_role_ids(input.remove_role_ids.as_ref())?;
    let actor = ctx.actor();

    let mut tx = ctx.lock_transaction().await?;
    let conn = tx.connection().map_err(internal_error)?;

    if let Some(name) = &name {
        ensure_name_free(name, Some(user_id), conn).await?;
    }

    let changes = UserChanges {
        name,
        phone: input.phone,
        password_hash: input
            .password
            .as_deref()
            .map(hash_password)
            .transpose()
            .map_err(internal_error)?,
    };
    let user = User::update(user_id, &changes, actor, conn)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| not_found("User", user_id))?;

    for &role_id in &remove_role_ids {
        UserRole::unlink(user_id, role_id, actor, conn)
            .await
            .map_err(internal_error)?;
    }
    link_roles(user_id, &add_role_ids, actor, conn).await?;

    info!(user_id = %user_id, actor = %actor, "User updated");
    Ok(UserData::from(user))
}

/// Soft delete a user and drop its role links
pub async fn delete_user(ctx: &GraphQLContext, id: ID) -> FieldResult<bool> {
    let user_id = UserId::try_from(&id)?;
    let actor = ctx.actor();

    let mut tx = ctx.lock_transaction().await?;
    let conn = tx.connection().map_err(internal_error)?;

    let deleted = User::soft_delete(user_id, actor, conn)
        .await
        .map_err(internal_error)?;
    if !deleted {
        return Err(not_found("User", user_id));
    }
    UserRole::unlink_user(user_id, actor, conn)
        .await
        .map_err(internal_error)?;

    info!(user_id = %user_id, actor = %actor, "User deleted");
    Ok(true)
}
