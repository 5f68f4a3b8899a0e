pub mod auth;
pub mod error_handling;
pub mod request_id;

pub use auth::{auth_middleware, SessionResolver, StaticSessionResolver};
pub use error_handling::ApiError;
pub use request_id::request_id_middleware;
