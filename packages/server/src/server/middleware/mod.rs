// HTTP middleware
pub mod request_scope;
pub mod response_cookie;

pub use request_scope::*;
pub use response_cookie::*;
