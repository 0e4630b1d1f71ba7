use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    Json,
};
use bookshelf_dal::error::{FieldError, ValidationErrors};
use http::StatusCode;
use serde::Serialize;
use tracing::error;

pub type ApiResult<T, E = ApiError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid book data: {0}")]
    InvalidInput(ValidationErrors),

    #[error("A book with ISBN {0} already exists")]
    DuplicateIsbn(String),

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Server error")]
    Store(bookshelf_dal::Error),

    #[error("Server error")]
    Internal(String),
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InvalidInput(_) | ApiError::DuplicateIsbn(_) | ApiError::InvalidBody(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::Store(_) | ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<bookshelf_dal::Error> for ApiError {
    fn from(value: bookshelf_dal::Error) -> Self {
        match value {
            bookshelf_dal::Error::RecordNotFound(_) => ApiError::NotFound("Book"),
            bookshelf_dal::Error::DuplicateIsbn(isbn) => ApiError::DuplicateIsbn(isbn),
            bookshelf_dal::Error::ValidationError(errors) => ApiError::InvalidInput(errors),
            e => ApiError::Store(e),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(value: JsonRejection) -> Self {
        ApiError::InvalidBody(value.body_text())
    }
}

impl From<garde::Report> for ApiError {
    fn from(value: garde::Report) -> Self {
        ApiError::InvalidInput(value.into())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorBody<'a> {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<&'a [FieldError]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            ApiError::InvalidInput(errors) => ErrorBody {
                message: self.to_string(),
                errors: Some(errors.errors()),
                error: None,
            },
            ApiError::Store(e) => {
                error!("Store error: {e}");
                ErrorBody {
                    message: self.to_string(),
                    errors: None,
                    error: Some(e.to_string()),
                }
            }
            ApiError::Internal(e) => {
                error!("Internal error: {e}");
                ErrorBody {
                    message: self.to_string(),
                    errors: None,
                    error: None,
                }
            }
            _ => ErrorBody {
                message: self.to_string(),
                errors: None,
                error: None,
            },
        };
        (status, Json(body)).into_response()
    }
}
