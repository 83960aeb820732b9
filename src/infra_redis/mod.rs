mod list_cache_redis;

pub use list_cache_redis::*;
