mod account;
mod block;
mod friend;

pub use account::*;
pub use block::*;
pub use friend::*;
