use axum::{
    extract::{FromRequestParts, Path},
    response::IntoResponse,
    routing::get,
    Json,
};
use bookshelf_dal::book::{BookRepository, CreateBook};
use http::{request::Parts, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    error::{ApiError, ApiResult},
    repository_from_request,
    state::AppState,
    validate::{Garde, JsonObject},
};

repository_from_request!(BookRepository);

/// Book id taken from the path, an id that is not an integer cannot name any book.
#[derive(Debug, Clone, Copy)]
pub struct BookId(pub i64);

impl<S: Send + Sync> FromRequestParts<S> for BookId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::NotFound("Book"))?;
        raw.parse::<i64>().map(BookId).map_err(|_| {
            debug!(id = %raw, "Invalid book id");
            ApiError::NotFound("Book")
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Confirmation {
    pub message: String,
}

pub async fn list(repository: BookRepository) -> ApiResult<impl IntoResponse> {
    let books = repository.list().await?;
    debug!(count = books.len(), "Listed books");
    Ok((StatusCode::OK, Json(books)))
}

pub async fn get_one(
    BookId(id): BookId,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    let record = repository.get(id).await?;

    Ok((StatusCode::OK, Json(record)))
}

pub async fn create(
    repository: BookRepository,
    Garde(JsonObject(payload)): Garde<JsonObject<CreateBook>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.create(payload).await?;
    debug!(id = record.id, isbn = %record.isbn, "Created book");

    Ok((StatusCode::CREATED, Json(record)))
}

pub async fn update(
    BookId(id): BookId,
    repository: BookRepository,
    Garde(JsonObject(payload)): Garde<JsonObject<CreateBook>>,
) -> ApiResult<impl IntoResponse> {
    let record = repository.update(id, payload).await?;
    debug!(id, "Updated book");

    Ok((StatusCode::OK, Json(record)))
}

pub async fn delete(
    BookId(id): BookId,
    repository: BookRepository,
) -> ApiResult<impl IntoResponse> {
    repository.delete(id).await?;
    debug!(id, "Deleted book");

    Ok((
        StatusCode::OK,
        Json(Confirmation {
            message: "Book deleted".to_string(),
        }),
    ))
}

pub fn router() -> axum::Router<AppState> {
    axum::Router::new()
        .route("/", get(list).post(create))
        .route("/{id}", get(get_one).put(update).delete(delete))
        .method_not_allowed_fallback(crate::rest_api::route_not_found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, Router};
    use bookshelf_dal::book::Book;
    use http::Request;
    use serde_json::{json, Value};
    use tower::ServiceExt as _;
    use tracing_test::traced_test;

    async fn test_app() -> Router {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        bookshelf_dal::migrate(&pool).await.unwrap();
        Router::new()
            .nest("/api/books", router())
            .fallback(crate::rest_api::route_not_found)
            .with_state(AppState::new(pool))
    }

    async fn call(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    #[traced_test]
    async fn test_book_lifecycle() {
        let app = test_app().await;

        let (status, body) = call(
            &app,
            "POST",
            "/api/books",
            Some(json!({"title": "Dune", "author": "Herbert", "isbn": "001"})),
        )
        .await;
        assert_eq!(StatusCode::CREATED, status);
        let dune: Book = serde_json::from_value(body).unwrap();
        assert_eq!(1, dune.id);
        assert_eq!(None, dune.publication_year);

        let (status, body) = call(
            &app,
            "POST",
            "/api/books",
            Some(json!({"title": "Foo", "author": "Bar", "isbn": "001"})),
        )
        .await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        assert!(body["message"].as_str().unwrap().contains("001"));

        let (status, body) = call(
            &app,
            "PUT",
            "/api/books/1",
            Some(json!({"title": "Dune (rev)", "author": "Herbert", "isbn": "001", "publication_year": 1965})),
        )
        .await;
        assert_eq!(StatusCode::OK, status);
        let updated: Book = serde_json::from_value(body).unwrap();
        assert_eq!("Dune (rev)", updated.title);
        assert_eq!(Some(1965), updated.publication_year);

        let (status, body) = call(&app, "GET", "/api/books/1", None).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!("Dune (rev)", body["title"]);

        let (status, body) = call(&app, "DELETE", "/api/books/1", None).await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!("Book deleted", body["message"]);

        let (status, body) = call(&app, "GET", "/api/books/1", None).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert_eq!("Book not found", body["message"]);
    }

    #[tokio::test]
    async fn test_list_order() {
        let app = test_app().await;
        for (title, isbn) in [("A", "1"), ("B", "2"), ("C", "3")] {
            let (status, _) = call(
                &app,
                "POST",
                "/api/books",
                Some(json!({"title": title, "author": "X", "isbn": isbn, "genre": ""})),
            )
            .await;
            assert_eq!(StatusCode::CREATED, status);
        }

        let (status, body) = call(&app, "GET", "/api/books", None).await;
        assert_eq!(StatusCode::OK, status);
        let books: Vec<Book> = serde_json::from_value(body).unwrap();
        let titles: Vec<_> = books.iter().map(|b| b.title.as_str()).collect();
        assert_eq!(vec!["C", "B", "A"], titles);
        assert!(books.iter().all(|b| b.genre.is_none()));
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let app = test_app().await;

        let (status, body) = call(&app, "POST", "/api/books", Some(json!({"title": "Dune"}))).await;
        assert_eq!(StatusCode::BAD_REQUEST, status);
        let fields: Vec<_> = body["errors"]
            .as_array()
            .unwrap()
            .iter()
            .map(|e| e["field"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(vec!["author", "isbn"], fields);

        let (status, _) = call(
            &app,
            "POST",
            "/api/books",
            Some(json!({"title": "Dune", "author": "Herbert", "isbn": "001", "publication_year": "old"})),
        )
        .await;
        assert_eq!(StatusCode::BAD_REQUEST, status);

        let (status, _) = call(
            &app,
            "POST",
            "/api/books",
            Some(json!(["Dune", "Herbert", "001"])),
        )
        .await;
        assert_eq!(StatusCode::BAD_REQUEST, status);

        let (_, body) = call(&app, "GET", "/api/books", None).await;
        assert_eq!(0, body.as_array().unwrap().len());
    }

    #[tokio::test]
    async fn test_not_found() {
        let app = test_app().await;
        let payload = json!({"title": "Dune", "author": "Herbert", "isbn": "001"});

        let (status, _) = call(&app, "PUT", "/api/books/7", Some(payload)).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        let (status, _) = call(&app, "DELETE", "/api/books/7", None).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        let (status, _) = call(&app, "GET", "/api/books/abc", None).await;
        assert_eq!(StatusCode::NOT_FOUND, status);

        let (status, body) = call(&app, "GET", "/api/authors", None).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert_eq!("Route not found", body["message"]);

        let (status, body) = call(&app, "PATCH", "/api/books/1", None).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert_eq!("Route not found", body["message"]);
        let (status, body) = call(&app, "DELETE", "/api/books", None).await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert_eq!("Route not found", body["message"]);
    }
}
