use crate::api::v1::handler::ApiResponse;
use crate::application_port::*;
use serde::Serialize;
use std::convert::Infallible;
use thiserror::Error;
use tracing::warn;
use warp::http::StatusCode;
use warp::{Rejection, reject};

pub async fn recover_error(err: Rejection) -> Result<impl warp::Reply, Infallible> {
    let error = if let Some(err) = err.find::<ApiError>() {
        err.clone()
    } else if err.is_not_found() {
        ApiError::new(ApiErrorCode::RouteNotFound, "no such route")
    } else if let Some(e) = err.find::<warp::filters::body::BodyDeserializeError>() {
        ApiError::new(ApiErrorCode::BadRequest, e.to_string())
    } else if let Some(e) = err.find::<warp::reject::InvalidQuery>() {
        ApiError::new(ApiErrorCode::BadRequest, e.to_string())
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ApiError::new(ApiErrorCode::MethodNotAllowed, "method not allowed")
    } else {
        warn!("unhandled rejection: {:?}", err);
        ApiError::new(ApiErrorCode::InternalError, "internal error")
    };

    let status = error.code.status();
    let json = warp::reply::json(&ApiResponse::<()>::err(error));
    Ok(warp::reply::with_status(json, status))
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    pub code: ApiErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ApiErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    fn internal<E: std::fmt::Display>(code: ApiErrorCode, error: E) -> Self {
        warn!("store error: {}", error);
        ApiError::new(code, code.to_string())
    }
}

impl reject::Reject for ApiError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiErrorCode {
    #[error("Cannot send a request to yourself")]
    SelfRequest,
    #[error("Account not found")]
    AccountNotFound,
    #[error("Request already pending")]
    DuplicatePending,
    #[error("A request from this account is waiting for you")]
    ReciprocalPending,
    #[error("Too many requests")]
    RateLimited,
    #[error("Interaction blocked")]
    Blocked,
    #[error("Not found")]
    NotFound,
    #[error("Forbidden")]
    Forbidden,
    #[error("Request already accepted")]
    AlreadyAccepted,
    #[error("Cannot block yourself")]
    SelfBlock,
    #[error("Account already blocked")]
    AlreadyBlocked,
    #[error("Account is not blocked")]
    NotBlocked,
    #[error("Insufficient role")]
    InsufficientRole,
    #[error("Email already registered")]
    EmailTaken,
    #[error("Token is not valid")]
    InvalidToken,
    #[error("Token has expired")]
    TokenExpired,
    #[error("Bad request")]
    BadRequest,
    #[error("Route not found")]
    RouteNotFound,
    #[error("Method not allowed")]
    MethodNotAllowed,
    #[error("Store temporarily unavailable")]
    StoreUnavailable,
    #[error("Concurrent update, try again")]
    StoreConflict,
    #[error("Internal error")]
    InternalError,
}

impl ApiErrorCode {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiErrorCode::SelfRequest
            | ApiErrorCode::SelfBlock
            | ApiErrorCode::BadRequest => StatusCode::BAD_REQUEST,
            ApiErrorCode::InvalidToken | ApiErrorCode::TokenExpired => StatusCode::UNAUTHORIZED,
            ApiErrorCode::Forbidden
            | ApiErrorCode::Blocked
            | ApiErrorCode::InsufficientRole => StatusCode::FORBIDDEN,
            ApiErrorCode::AccountNotFound
            | ApiErrorCode::NotFound
            | ApiErrorCode::NotBlocked
            | ApiErrorCode::RouteNotFound => StatusCode::NOT_FOUND,
            ApiErrorCode::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            ApiErrorCode::DuplicatePending
            | ApiErrorCode::ReciprocalPending
            | ApiErrorCode::AlreadyAccepted
            | ApiErrorCode::AlreadyBlocked
            | ApiErrorCode::EmailTaken
            | ApiErrorCode::StoreConflict => StatusCode::CONFLICT,
            ApiErrorCode::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            ApiErrorCode::StoreUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            ApiErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<RelationError> for ApiError {
    fn from(error: RelationError) -> Self {
        let code = match &error {
            RelationError::SelfRequest => ApiErrorCode::SelfRequest,
            RelationError::AccountNotFound => ApiErrorCode::AccountNotFound,
            RelationError::DuplicatePending => ApiErrorCode::DuplicatePending,
            RelationError::ReciprocalPending => ApiErrorCode::ReciprocalPending,
            RelationError::RateLimited { .. } => ApiErrorCode::RateLimited,
            RelationError::Blocked => ApiErrorCode::Blocked,
            RelationError::NotFound => ApiErrorCode::NotFound,
            RelationError::Forbidden => ApiErrorCode::Forbidden,
            RelationError::AlreadyAccepted => ApiErrorCode::AlreadyAccepted,
            RelationError::SelfBlock => ApiErrorCode::SelfBlock,
            RelationError::AlreadyBlocked => ApiErrorCode::AlreadyBlocked,
            RelationError::NotBlocked => ApiErrorCode::NotBlocked,
            RelationError::InsufficientRole { .. } => ApiErrorCode::InsufficientRole,
            RelationError::StoreUnavailable(e) => {
                return ApiError::internal(ApiErrorCode::StoreUnavailable, e);
            }
            RelationError::StoreConflict(e) => {
                return ApiError::internal(ApiErrorCode::StoreConflict, e);
            }
        };
        ApiError::new(code, error.to_string())
    }
}

impl From<IdentityError> for ApiError {
    fn from(error: IdentityError) -> Self {
        let code = match error {
            IdentityError::TokenInvalid => ApiErrorCode::InvalidToken,
            IdentityError::TokenExpired => ApiErrorCode::TokenExpired,
            IdentityError::InsufficientRole { .. } => ApiErrorCode::InsufficientRole,
        };
        ApiError::new(code, error.to_string())
    }
}

impl From<AccountError> for ApiError {
    fn from(error: AccountError) -> Self {
        let code = match &error {
            AccountError::NotFound => ApiErrorCode::AccountNotFound,
            AccountError::EmailTaken => ApiErrorCode::EmailTaken,
            AccountError::InsufficientRole { .. } => ApiErrorCode::InsufficientRole,
            AccountError::Store(e) => return ApiError::internal(ApiErrorCode::StoreUnavailable, e),
        };
        ApiError::new(code, error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain_model::Role;

    #[test]
    fn relation_errors_keep_their_message_but_store_errors_do_not() {
        let limited = ApiError::from(RelationError::RateLimited {
            max_requests: 3,
            window_secs: 60,
        });
        assert_eq!(limited.code, ApiErrorCode::RateLimited);
        assert_eq!(limited.code.status(), StatusCode::TOO_MANY_REQUESTS);
        assert!(limited.message.contains("3"));

        let store = ApiError::from(RelationError::StoreUnavailable("dsn=secret".into()));
        assert_eq!(store.code.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert!(!store.message.contains("secret"));
    }

    #[test]
    fn codes_serialize_as_snake_case() {
        let err = ApiError::from(IdentityError::InsufficientRole {
            required: Role::Admin,
        });
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "insufficient_role");
    }
}
