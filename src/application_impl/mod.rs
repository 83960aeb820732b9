mod account_service_impl;
mod block_guard;
mod cached_relationship_service;
mod friend_request_machine;
mod friendship_view;
mod identity_provider_fake;
mod identity_provider_jwt;
mod pair_lock;
mod rate_limiter;
mod relationship_service_impl;

pub use account_service_impl::*;
pub use block_guard::*;
pub use cached_relationship_service::*;
pub use friend_request_machine::*;
pub use friendship_view::*;
pub use identity_provider_fake::*;
pub use identity_provider_jwt::*;
pub use pair_lock::*;
pub use rate_limiter::*;
pub use relationship_service_impl::*;
