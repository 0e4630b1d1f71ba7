use std::any::Any;
use std::path::Path;

use crate::config::ServerConfig;
use crate::error::Result;
use axum::handler::HandlerWithoutStateExt as _;
use axum::http::StatusCode;
use axum::response::Response;
use axum::{response::IntoResponse, routing::get, Json, Router};
use bookshelf_app::error::{ApiError, ApiResult};
use bookshelf_app::rest_api::route_not_found;
use bookshelf_app::state::AppState;
use bookshelf_dal::book::BookRepository;
use futures::FutureExt;
use serde_json::json;
use tower_http::{
    catch_panic::CatchPanicLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::{info, warn, Level};

pub async fn run(args: ServerConfig) -> Result<()> {
    let state = build_state(&args).await?;
    run_with_state(args, state).await
}

pub async fn run_with_state(args: ServerConfig, state: AppState) -> Result<()> {
    let shutdown = tokio::signal::ctrl_c().map(|_| ());
    run_graceful_with_state(args, state, shutdown).await
}

pub async fn run_graceful_with_state<S>(
    args: ServerConfig,
    state: AppState,
    shutdown_signal: S,
) -> Result<()>
where
    S: std::future::Future<Output = ()> + Send + 'static,
{
    if !args.static_dir.is_dir() {
        warn!(static_dir = ?args.static_dir, "Static directory does not exist");
    }

    let mut app = main_router(state, &args.static_dir);

    if !args.no_cors {
        app = app.layer(tower_http::cors::CorsLayer::very_permissive());
    }

    let app = app
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        );

    let ip: std::net::IpAddr = args.listen_address.parse()?;
    let addr = std::net::SocketAddr::from((ip, args.port));
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal)
        .await?;

    info!("Server stopped");
    Ok(())
}

pub fn main_router(state: AppState, static_dir: &Path) -> Router<()> {
    // directories resolve to their index.html, so / serves the web page
    let static_files = ServeDir::new(static_dir)
        .call_fallback_on_method_not_allowed(true)
        .fallback(route_not_found.into_service());

    Router::new()
        .nest("/api/books", bookshelf_app::rest_api::book::router())
        .route("/health", get(health))
        .method_not_allowed_fallback(route_not_found)
        .fallback_service(static_files)
        .with_state(state)
}

fn panic_response(_err: Box<dyn Any + Send + 'static>) -> Response {
    ApiError::Internal("request handler panicked".to_string()).into_response()
}

async fn health(repository: BookRepository) -> ApiResult<impl IntoResponse> {
    let books = repository.count().await?;
    Ok((
        StatusCode::OK,
        Json(json!({"message": "Server is running", "books": books})),
    ))
}

pub async fn build_state(config: &ServerConfig) -> Result<AppState> {
    let data_dir = config.data_dir();
    if !data_dir.is_dir() {
        tokio::fs::create_dir_all(&data_dir).await?;
        info!(data_dir = ?data_dir, "Created data directory");
    }

    let database_url = config.database_url();
    let pool = bookshelf_dal::new_pool_with(&database_url, &config.pool_settings()).await?;
    bookshelf_dal::migrate(&pool).await?;
    info!(database = %database_url, "Database ready");

    Ok(AppState::new(pool))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt as _;

    async fn test_router(static_dir: &Path) -> Router {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .connect("sqlite::memory:")
            .await
            .unwrap();
        bookshelf_dal::migrate(&pool).await.unwrap();
        main_router(AppState::new(pool), static_dir)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        send(app, "GET", uri).await
    }

    async fn send(app: Router, method: &str, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(
                Request::builder()
                    .method(method)
                    .uri(uri)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, String::from_utf8_lossy(&body).to_string())
    }

    #[tokio::test]
    async fn test_static_and_fallback() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.html"), "<h1>Books</h1>").unwrap();
        let app = test_router(dir.path()).await;

        let (status, body) = get(app.clone(), "/").await;
        assert_eq!(StatusCode::OK, status);
        assert_eq!("<h1>Books</h1>", body);

        let (status, body) = get(app.clone(), "/missing.css").await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert!(body.contains("Route not found"));

        let (status, body) = get(app.clone(), "/api/unknown").await;
        assert_eq!(StatusCode::NOT_FOUND, status);
        assert!(body.contains("Route not found"));

        let (status, body) = get(app, "/health").await;
        assert_eq!(StatusCode::OK, status);
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(0, body["books"]);
    }

    #[tokio::test]
    async fn test_unknown_routes_any_method() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_router(dir.path()).await;

        for (method, uri) in [
            ("POST", "/api/unknown"),
            ("DELETE", "/api/nothing"),
            ("PUT", "/x"),
            ("PATCH", "/api/books/1"),
            ("DELETE", "/api/books"),
            ("POST", "/health"),
        ] {
            let (status, body) = send(app.clone(), method, uri).await;
            assert_eq!(StatusCode::NOT_FOUND, status, "{method} {uri}");
            let body: serde_json::Value = serde_json::from_str(&body).unwrap();
            assert_eq!("Route not found", body["message"], "{method} {uri}");
        }
    }
}
