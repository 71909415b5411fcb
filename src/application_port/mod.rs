mod auth_service;
mod connection_service;
mod error_kind;
mod post_service;
mod profile_service;

pub use auth_service::*;
pub use connection_service::*;
pub use error_kind::*;
pub use post_service::*;
pub use profile_service::*;
