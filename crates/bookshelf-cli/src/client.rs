use bookshelf_dal::book::{Book, CreateBook};
use reqwest::{Response, StatusCode};
use serde::Deserialize;
use tracing::debug;
use url::Url;

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("{message} ({status})")]
    Api { status: StatusCode, message: String },
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Invalid server URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
            ClientError::InvalidUrl(_) => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Debug, Deserialize)]
struct Confirmation {
    message: String,
}

/// HTTP client for the `/api/books` resource.
#[derive(Debug, Clone)]
pub struct BookClient {
    client: reqwest::Client,
    base_url: Url,
}

impl BookClient {
    pub fn new(server_url: &Url) -> Result<Self> {
        Self::with_client(reqwest::Client::new(), server_url)
    }

    pub fn with_client(client: reqwest::Client, server_url: &Url) -> Result<Self> {
        let mut base_url = server_url.clone();
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        // join fails early for URLs that cannot be a base, like mailto:
        base_url.join("api/books")?;
        Ok(BookClient { client, base_url })
    }

    fn books_url(&self) -> Result<Url> {
        Ok(self.base_url.join("api/books")?)
    }

    fn book_url(&self, id: i64) -> Result<Url> {
        Ok(self.base_url.join(&format!("api/books/{id}"))?)
    }

    pub async fn list(&self) -> Result<Vec<Book>> {
        let response = self.client.get(self.books_url()?).send().await?;
        let books = check(response).await?.json().await?;
        Ok(books)
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        let response = self.client.get(self.book_url(id)?).send().await?;
        let book = check(response).await?.json().await?;
        Ok(book)
    }

    pub async fn create(&self, book: &CreateBook) -> Result<Book> {
        let response = self
            .client
            .post(self.books_url()?)
            .json(book)
            .send()
            .await?;
        let book: Book = check(response).await?.json().await?;
        debug!(id = book.id, "Book created");
        Ok(book)
    }

    pub async fn update(&self, id: i64, book: &CreateBook) -> Result<Book> {
        let response = self
            .client
            .put(self.book_url(id)?)
            .json(book)
            .send()
            .await?;
        let book = check(response).await?.json().await?;
        debug!(id, "Book updated");
        Ok(book)
    }

    /// Deletes the book and returns the server's confirmation message.
    pub async fn delete(&self, id: i64) -> Result<String> {
        let response = self.client.delete(self.book_url(id)?).send().await?;
        let confirmation: Confirmation = check(response).await?.json().await?;
        debug!(id, "Book deleted");
        Ok(confirmation.message)
    }
}

async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<ErrorBody>(&body)
        .map(|b| b.message)
        .unwrap_or_else(|_| {
            status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
    debug!(%status, %message, "Server returned error");
    Err(ClientError::Api { status, message })
}
