use anyhow::Result;
use bookshelf_dal::book::Book;
use reqwest::StatusCode;
use serde_json::Value;
use url::Url;

pub async fn create_book(client: &reqwest::Client, base_url: &Url, payload: &Value) -> Result<Book> {
    let api_url = base_url.join("api/books")?;

    let response = client.post(api_url).json(payload).send().await?;
    assert_eq!(StatusCode::CREATED, response.status());

    let new_book: Book = response.json().await?;
    Ok(new_book)
}

/// Sends a request and returns status with the JSON body, `Value::Null` for a non JSON body.
pub async fn call(
    client: &reqwest::Client,
    method: reqwest::Method,
    url: Url,
    payload: Option<&Value>,
) -> Result<(StatusCode, Value)> {
    let mut request = client.request(method, url);
    if let Some(payload) = payload {
        request = request.json(payload);
    }
    let response = request.send().await?;
    let status = response.status();
    let body = response.text().await?;
    let value = serde_json::from_str(&body).unwrap_or(Value::Null);
    Ok((status, value))
}
