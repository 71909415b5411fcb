mod key_value_store_memory;
mod mock_backend;
mod seed;
mod token_codec_jwt;

pub use key_value_store_memory::*;
pub use mock_backend::*;
pub use seed::SEED_PASSWORD;
pub use token_codec_jwt::*;
