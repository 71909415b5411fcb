mod api_client;
mod wire;

pub use api_client::*;
pub use wire::*;
