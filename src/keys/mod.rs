//! Keys Module
//!
//! Cache key derivation from call arguments.

mod cache_key;
mod deriver;

pub use cache_key::CacheKey;
pub use deriver::KeyDeriver;
