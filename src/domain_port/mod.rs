// store

mod list_cache;
mod time_source;

pub use list_cache::*;
pub use time_source::*;

// repo

mod account_repo;
mod block_repo;
mod friend_request_repo;

pub use account_repo::*;
pub use block_repo::*;
pub use friend_request_repo::*;
