mod list_cache_memory;
mod relationship_store_memory;

pub use list_cache_memory::*;
pub use relationship_store_memory::*;
