mod error;
mod handler;
mod retry;
mod router;

pub use error::{ApiError, ApiErrorCode, recover_error};
pub use handler::{ApiResponse, Page, PageQuery};
pub use retry::RetryPolicy;
pub use router::{api, routes};
