use bookshelf_dal::book::Book;
use bookshelf_e2e_tests::{
    prepare_env,
    rest::{call, create_book},
    spawn_server,
};
use reqwest::{Method, StatusCode};
use serde_json::json;
use tracing::info;
use tracing_test::traced_test;

#[tokio::test]
#[traced_test]
async fn test_book_scenario() {
    let (args, _config_guard) = prepare_env("test_book_scenario").await.unwrap();
    let (base_url, _server) = spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();
    let api_url = base_url.join("api/books").unwrap();
    let book_url = |id: i64| base_url.join(&format!("api/books/{id}")).unwrap();

    let dune = create_book(
        &client,
        &base_url,
        &json!({"title": "Dune", "author": "Herbert", "isbn": "001"}),
    )
    .await
    .unwrap();
    assert_eq!(1, dune.id);

    let (status, body) = call(
        &client,
        Method::POST,
        api_url.clone(),
        Some(&json!({"title": "Foo", "author": "Bar", "isbn": "001"})),
    )
    .await
    .unwrap();
    info!("Duplicate response: {body}");
    assert_eq!(StatusCode::BAD_REQUEST, status);
    assert!(body["message"].as_str().unwrap().contains("001"));

    let (status, body) = call(
        &client,
        Method::PUT,
        book_url(1),
        Some(&json!({"title": "Dune (rev)", "author": "Herbert", "isbn": "001", "publication_year": 1965})),
    )
    .await
    .unwrap();
    assert_eq!(StatusCode::OK, status);
    let updated: Book = serde_json::from_value(body).unwrap();
    assert_eq!("Dune (rev)", updated.title);
    assert_eq!(Some(1965), updated.publication_year);
    assert_eq!(dune.created_at, updated.created_at);

    let (status, body) = call(&client, Method::DELETE, book_url(1), None).await.unwrap();
    assert_eq!(StatusCode::OK, status);
    assert_eq!("Book deleted", body["message"]);

    let (status, body) = call(&client, Method::GET, book_url(1), None).await.unwrap();
    assert_eq!(StatusCode::NOT_FOUND, status);
    assert_eq!("Book not found", body["message"]);

    let (status, body) = call(&client, Method::GET, api_url, None).await.unwrap();
    assert_eq!(StatusCode::OK, status);
    assert_eq!(0, body.as_array().unwrap().len());
}

#[tokio::test]
#[traced_test]
async fn test_validation_and_not_found() {
    let (args, _config_guard) = prepare_env("test_validation").await.unwrap();
    let (base_url, _server) = spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();
    let api_url = base_url.join("api/books").unwrap();

    let (status, body) = call(&client, Method::POST, api_url.clone(), Some(&json!({"title": " "})))
        .await
        .unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, status);
    let fields: Vec<_> = body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(vec!["title", "author", "isbn"], fields);

    let response = client
        .post(api_url.clone())
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(StatusCode::BAD_REQUEST, response.status());

    for (method, path) in [
        (Method::GET, "api/books/99"),
        (Method::DELETE, "api/books/99"),
        (Method::GET, "api/books/abc"),
    ] {
        let (status, _) = call(&client, method, base_url.join(path).unwrap(), None)
            .await
            .unwrap();
        assert_eq!(StatusCode::NOT_FOUND, status, "{path}");
    }

    let (status, body) = call(&client, Method::GET, api_url, None).await.unwrap();
    assert_eq!(StatusCode::OK, status);
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
#[traced_test]
async fn test_list_newest_first() {
    let (args, _config_guard) = prepare_env("test_list_order").await.unwrap();
    let (base_url, _server) = spawn_server(args).await.unwrap();
    let client = reqwest::Client::new();

    for (title, isbn) in [("Dune", "001"), ("Neuromancer", "002"), ("Solaris", "003")] {
        create_book(
            &client,
            &base_url,
            &json!({"title": title, "author": "Various", "isbn": isbn}),
        )
        .await
        .unwrap();
    }

    let books: Vec<Book> = client
        .get(base_url.join("api/books").unwrap())
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let ids: Vec<_> = books.iter().map(|b| b.id).collect();
    assert_eq!(vec![3, 2, 1], ids);
}
