mod session_store;

pub use session_store::*;

// api-backed services

mod auth_service_api;
mod connection_service_api;
mod post_service_api;
mod profile_service_api;

pub use auth_service_api::*;
pub use connection_service_api::ApiConnectionService;
pub use post_service_api::ApiPostService;
pub use profile_service_api::*;

// mock-backed services

mod auth_service_mock;
mod connection_service_mock;
mod mock_session;
mod post_service_mock;
mod profile_service_mock;

pub use auth_service_mock::*;
pub use connection_service_mock::*;
pub use post_service_mock::*;
pub use profile_service_mock::*;
