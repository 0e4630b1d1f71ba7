pub mod book;

use crate::error::ApiError;

/// Fallback for unknown API routes.
pub async fn route_not_found() -> ApiError {
    ApiError::NotFound("Route")
}
