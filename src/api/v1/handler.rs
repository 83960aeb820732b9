use super::error::*;
use super::retry::RetryPolicy;
use crate::application_port::*;
use crate::domain_model::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use warp::http::StatusCode;
use warp::{self, reject};

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<ApiError>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        ApiResponse {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(error: ApiError) -> Self {
        ApiResponse {
            success: false,
            data: None,
            error: Some(error),
        }
    }
}

const DEFAULT_PAGE_SIZE: usize = 10;
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct Page<T> {
    pub count: usize,
    pub page: usize,
    pub page_size: usize,
    pub results: Vec<T>,
}

impl<T> Page<T> {
    /// Cuts one page out of `items`. Pages are 1-based; a page past the end
    /// is empty.
    pub fn slice(items: Vec<T>, query: &PageQuery) -> Result<Self, ApiError> {
        let page = query.page.unwrap_or(1);
        let page_size = query
            .page_size
            .unwrap_or(DEFAULT_PAGE_SIZE)
            .min(MAX_PAGE_SIZE);
        if page == 0 || page_size == 0 {
            return Err(ApiError::new(
                ApiErrorCode::BadRequest,
                "page and page_size start at 1",
            ));
        }

        let count = items.len();
        let results = items
            .into_iter()
            .skip((page - 1).saturating_mul(page_size))
            .take(page_size)
            .collect();
        Ok(Page {
            count,
            page,
            page_size,
            results,
        })
    }
}

fn ok<T: Serialize>(data: T) -> warp::reply::Json {
    warp::reply::json(&ApiResponse::ok(data))
}

fn gate(identity: &Identity, role: Role) -> Result<(), warp::Rejection> {
    identity
        .require(role)
        .map_err(ApiError::from)
        .map_err(reject::custom)
}

#[derive(Debug, Deserialize)]
pub struct SendRequestBody {
    pub sent_to: AccountId,
}

#[derive(Debug, Serialize)]
pub struct SendRequestResponse {
    pub request_id: FriendRequestId,
}

pub async fn send_request(
    body: SendRequestBody,
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    let request_id = retry
        .run(|| relationship_service.send_request(identity.account_id, body.sent_to))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    Ok(warp::reply::with_status(
        ok(SendRequestResponse { request_id }),
        StatusCode::CREATED,
    ))
}

pub async fn list_pending(
    query: PageQuery,
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    let pending = retry
        .run(|| relationship_service.list_pending(identity.account_id))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    let page = Page::slice(pending, &query).map_err(reject::custom)?;
    Ok(ok(page))
}

pub async fn get_pending(
    request: FriendRequestId,
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    let record = retry
        .run(|| relationship_service.get_pending(identity.account_id, request))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;
    Ok(ok(record))
}

pub async fn accept_request(
    request: FriendRequestId,
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    let accepted = retry
        .run(|| relationship_service.accept_request(request, identity.account_id))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;
    Ok(ok(accepted))
}

pub async fn reject_request(
    request: FriendRequestId,
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    let removed = retry
        .run(|| relationship_service.reject_request(request, identity.account_id))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;
    Ok(ok(removed))
}

pub async fn list_friends(
    query: PageQuery,
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    let friends = retry
        .run(|| relationship_service.list_friends(identity.account_id))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    let page = Page::slice(friends, &query).map_err(reject::custom)?;
    Ok(ok(page))
}

pub async fn get_friendship(
    request: FriendRequestId,
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    let record = retry
        .run(|| relationship_service.get_friendship(identity.account_id, request))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;
    Ok(ok(record))
}

#[derive(Debug, Deserialize)]
pub struct BlockBody {
    pub blocked_user: AccountId,
}

pub async fn block_user(
    body: BlockBody,
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    retry
        .run(|| relationship_service.block_user(identity.account_id, body.blocked_user))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;
    Ok(warp::reply::with_status(ok(()), StatusCode::CREATED))
}

pub async fn unblock_user(
    target: AccountId,
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    retry
        .run(|| relationship_service.unblock_user(identity.account_id, target))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;
    Ok(ok(()))
}

pub async fn list_blocked(
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    let blocked = retry
        .run(|| relationship_service.list_blocked(identity.account_id))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;
    Ok(ok(blocked))
}

pub async fn block_status(
    subject: AccountId,
    identity: Identity,
    relationship_service: Arc<dyn RelationshipService>,
    retry: Arc<RetryPolicy>,
) -> Result<impl warp::Reply, warp::Rejection> {
    gate(&identity, Role::Read)?;
    let status = retry
        .run(|| relationship_service.block_status(identity.account_id, subject))
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;
    Ok(ok(status))
}

#[derive(Debug, Default, Deserialize)]
pub struct UserQuery {
    pub search: Option<String>,
    pub page: Option<usize>,
    pub page_size: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct UserSummary {
    pub id: AccountId,
    pub email: String,
    pub name: String,
}

pub async fn find_users(
    query: UserQuery,
    identity: Identity,
    account_service: Arc<dyn AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let users = account_service
        .find_users(&identity, query.search.as_deref())
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;

    let users = users
        .into_iter()
        .map(|a| UserSummary {
            id: a.id,
            email: a.email,
            name: a.name,
        })
        .collect();
    let paging = PageQuery {
        page: query.page,
        page_size: query.page_size,
    };
    let page = Page::slice(users, &paging).map_err(reject::custom)?;
    Ok(ok(page))
}

#[derive(Debug, Deserialize)]
pub struct RoleBody {
    pub role: Role,
}

pub async fn change_role(
    target: AccountId,
    body: RoleBody,
    identity: Identity,
    account_service: Arc<dyn AccountService>,
) -> Result<impl warp::Reply, warp::Rejection> {
    let account = account_service
        .change_role(&identity, target, body.role)
        .await
        .map_err(ApiError::from)
        .map_err(reject::custom)?;
    Ok(ok(account))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<usize>, page_size: Option<usize>) -> PageQuery {
        PageQuery { page, page_size }
    }

    #[test]
    fn pages_are_one_based_and_clamped() {
        let items: Vec<u32> = (1..=25).collect();

        let first = Page::slice(items.clone(), &query(None, None)).unwrap();
        assert_eq!(first.count, 25);
        assert_eq!(first.results, (1..=10).collect::<Vec<_>>());

        let last = Page::slice(items.clone(), &query(Some(3), None)).unwrap();
        assert_eq!(last.results, vec![21, 22, 23, 24, 25]);

        let past = Page::slice(items.clone(), &query(Some(9), None)).unwrap();
        assert!(past.results.is_empty());

        let big = Page::slice(items.clone(), &query(None, Some(1000))).unwrap();
        assert_eq!(big.page_size, MAX_PAGE_SIZE);
        assert_eq!(big.results.len(), 25);

        assert!(Page::slice(items, &query(Some(0), None)).is_err());
    }
}
