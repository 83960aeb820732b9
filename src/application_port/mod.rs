mod account_service;
mod identity_provider;
mod relationship_service;

pub use account_service::*;
pub use identity_provider::*;
pub use relationship_service::*;
