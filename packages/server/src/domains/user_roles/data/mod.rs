pub mod user_role_types;

pub use user_role_types::UserRoleData;
