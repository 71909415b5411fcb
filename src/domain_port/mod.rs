// store

mod key_value_store;

pub use key_value_store::*;

// credentials

mod token_codec;

pub use token_codec::*;
