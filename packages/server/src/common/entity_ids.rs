//! Typed ID definitions for the domain entities.

pub use super::id::Id;

/// Marker type for User entities.
pub struct User;

/// Marker type for Role entities.
pub struct Role;

/// Marker type for UserRole link rows.
pub struct UserRole;

pub type UserId = Id<User>;

pub type RoleId = Id<Role>;

pub type UserRoleId = Id<UserRole>;
