mod account_repo_mysql;
mod block_repo_mysql;
mod friend_request_repo_mysql;

pub use account_repo_mysql::*;
pub use block_repo_mysql::*;
pub use friend_request_repo_mysql::*;

mod util;
