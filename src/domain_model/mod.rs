mod connection;
mod field_errors;
mod post;
mod session;
mod user;

pub use connection::*;
pub use field_errors::*;
pub use post::*;
pub use session::*;
pub use user::*;
