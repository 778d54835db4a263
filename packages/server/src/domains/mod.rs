// Business domains
pub mod auth;
pub mod roles;
pub mod user_roles;
pub mod users;
