use super::error::*;
use super::handler;
use crate::application_port::*;
use crate::domain_model::{AccountId, FriendRequestId};
use crate::server::Server;
use std::convert::Infallible;
use std::sync::Arc;
use warp::{Filter, http, reject};

pub fn routes(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = warp::Rejection> + Clone {
    let identity = with_identity(server.identity_provider.clone());
    let relations = with(server.relationship_service.clone());
    let retry = with(server.retry.clone());
    let accounts = with(server.account_service.clone());

    let send_request = warp::post()
        .and(warp::path("send_request"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(identity.clone())
        .and(relations.clone())
        .and(retry.clone())
        .and_then(handler::send_request);

    let pending_requests = warp::get()
        .and(warp::path("pending_requests"))
        .and(warp::path::end())
        .and(warp::query::<handler::PageQuery>())
        .and(identity.clone())
        .and(relations.clone())
        .and(retry.clone())
        .and_then(handler::list_pending);

    let pending_request = warp::get()
        .and(warp::path!("pending_requests" / FriendRequestId))
        .and(identity.clone())
        .and(relations.clone())
        .and(retry.clone())
        .and_then(handler::get_pending);

    let reject_request = warp::delete()
        .and(warp::path!("reject_request" / FriendRequestId))
        .and(identity.clone())
        .and(relations.clone())
        .and(retry.clone())
        .and_then(handler::reject_request);

    let accept_request = warp::put()
        .and(warp::path!("accept_request" / FriendRequestId))
        .and(identity.clone())
        .and(relations.clone())
        .and(retry.clone())
        .and_then(handler::accept_request);

    let view_friends = warp::get()
        .and(warp::path("view_friends"))
        .and(warp::path::end())
        .and(warp::query::<handler::PageQuery>())
        .and(identity.clone())
        .and(relations.clone())
        .and(retry.clone())
        .and_then(handler::list_friends);

    let view_friend = warp::get()
        .and(warp::path!("view_friends" / FriendRequestId))
        .and(identity.clone())
        .and(relations.clone())
        .and(retry.clone())
        .and_then(handler::get_friendship);

    let block = warp::post()
        .and(warp::path("block"))
        .and(warp::path::end())
        .and(warp::body::json())
        .and(identity.clone())
        .and(relations.clone())
        .and(retry.clone())
        .and_then(handler::block_user);

    let unblock = warp::delete()
        .and(warp::path!("block" / AccountId))
        .and(identity.clone())
        .and(relations.clone())
        .and(retry.clone())
        .and_then(handler::unblock_user);

    let blocked = warp::get()
        .and(warp::path("blocked"))
        .and(warp::path::end())
        .and(identity.clone())
        .and(relations.clone())
        .and(retry.clone())
        .and_then(handler::list_blocked);

    let block_status = warp::get()
        .and(warp::path!("users" / AccountId / "block_status"))
        .and(identity.clone())
        .and(relations)
        .and(retry)
        .and_then(handler::block_status);

    let users = warp::get()
        .and(warp::path("users"))
        .and(warp::path::end())
        .and(warp::query::<handler::UserQuery>())
        .and(identity.clone())
        .and(accounts.clone())
        .and_then(handler::find_users);

    let change_role = warp::put()
        .and(warp::path!("users" / AccountId / "role"))
        .and(warp::body::json())
        .and(identity)
        .and(accounts)
        .and_then(handler::change_role);

    send_request
        .or(pending_requests)
        .or(pending_request)
        .or(reject_request)
        .or(accept_request)
        .or(view_friends)
        .or(view_friend)
        .or(block)
        .or(unblock)
        .or(blocked)
        .or(block_status)
        .or(users)
        .or(change_role)
}

/// `/api/v1/...` with error recovery, as served by the binary.
pub fn api(
    server: Arc<Server>,
) -> impl Filter<Extract = (impl warp::Reply,), Error = Infallible> + Clone {
    warp::path("api")
        .and(warp::path("v1"))
        .and(routes(server))
        .recover(recover_error)
}

fn with<ServiceType>(
    service: Arc<ServiceType>,
) -> impl Filter<Extract = (Arc<ServiceType>,), Error = Infallible> + Clone
where
    ServiceType: Send + Sync + ?Sized,
{
    warp::any().map(move || service.clone())
}

fn with_identity(
    identity_provider: Arc<dyn IdentityProvider>,
) -> impl Filter<Extract = (Identity,), Error = warp::Rejection> + Clone {
    warp::header::optional::<String>(http::header::AUTHORIZATION.as_ref()).and_then(
        move |header: Option<String>| {
            let identity_provider = identity_provider.clone();
            async move {
                let Some(token) = header.as_deref().and_then(|h| h.strip_prefix("Bearer ")) else {
                    return Err(reject::custom(ApiError::new(
                        ApiErrorCode::InvalidToken,
                        "missing bearer token",
                    )));
                };
                identity_provider
                    .verify_token(token)
                    .await
                    .map_err(ApiError::from)
                    .map_err(reject::custom)
            }
        },
    )
}
