use crate::{Error, error::Result};
use futures::TryStreamExt as _;
use garde::Validate;
use serde::{Deserialize, Serialize};
use sqlx::Pool;
use tracing::debug;

fn required(value: &str, _ctx: &()) -> garde::Result {
    if value.trim().is_empty() {
        Err(garde::Error::new("is required"))
    } else {
        Ok(())
    }
}

/// Book fields as supplied by clients, used both for creation and for full replacement on update.
///
/// Missing required fields deserialize as empty strings, so validation can report all of them at once.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq, Validate)]
pub struct CreateBook {
    #[serde(default)]
    #[garde(custom(required), length(chars, max = 255))]
    pub title: String,
    #[serde(default)]
    #[garde(custom(required), length(chars, max = 255))]
    pub author: String,
    #[serde(default)]
    #[garde(custom(required), length(chars, max = 20))]
    pub isbn: String,
    #[serde(default)]
    #[garde(skip)]
    pub publication_year: Option<i64>,
    #[serde(default)]
    #[garde(length(chars, max = 100))]
    pub genre: Option<String>,
}

impl CreateBook {
    pub fn new(
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
    ) -> Self {
        CreateBook {
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            ..Default::default()
        }
    }

    pub fn with_publication_year(mut self, year: i64) -> Self {
        self.publication_year = Some(year);
        self
    }

    pub fn with_genre(mut self, genre: impl Into<String>) -> Self {
        self.genre = Some(genre.into());
        self
    }

    // empty genre is stored as NULL
    fn normalized(mut self) -> Self {
        if self.genre.as_deref().is_some_and(|g| g.trim().is_empty()) {
            self.genre = None;
        }
        self
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub publication_year: Option<i64>,
    pub genre: Option<String>,
    pub created_at: time::PrimitiveDateTime,
    pub updated_at: time::PrimitiveDateTime,
}

impl From<Book> for CreateBook {
    fn from(book: Book) -> Self {
        CreateBook {
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            publication_year: book.publication_year,
            genre: book.genre,
        }
    }
}

fn write_error(error: sqlx::Error, isbn: &str) -> Error {
    match error {
        sqlx::Error::Database(ref db_error) if db_error.is_unique_violation() => {
            debug!(isbn, "ISBN uniqueness enforced by database constraint");
            Error::DuplicateIsbn(isbn.to_string())
        }
        e => e.into(),
    }
}

pub type BookRepository = BookRepositoryImpl<Pool<crate::ChosenDB>>;

pub struct BookRepositoryImpl<E> {
    executor: E,
}

impl<'c, E> BookRepositoryImpl<E>
where
    for<'a> &'a E: sqlx::Executor<'c, Database = crate::ChosenDB>,
{
    pub fn new(executor: E) -> Self {
        Self { executor }
    }

    /// All books, most recently created first.
    pub async fn list(&self) -> Result<Vec<Book>> {
        let records = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, isbn, publication_year, genre, created_at, updated_at \
             FROM book ORDER BY id DESC",
        )
        .fetch(&self.executor)
        .try_collect::<Vec<_>>()
        .await?;
        Ok(records)
    }

    pub async fn count(&self) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM book")
            .fetch_one(&self.executor)
            .await?;
        Ok(count)
    }

    pub async fn get(&self, id: i64) -> Result<Book> {
        sqlx::query_as::<_, Book>(
            "SELECT id, title, author, isbn, publication_year, genre, created_at, updated_at \
             FROM book WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.executor)
        .await?
        .ok_or_else(|| Error::RecordNotFound(format!("Book {id}")))
    }

    pub async fn find_by_isbn(&self, isbn: &str) -> Result<Option<Book>> {
        let record = sqlx::query_as::<_, Book>(
            "SELECT id, title, author, isbn, publication_year, genre, created_at, updated_at \
             FROM book WHERE isbn = ?",
        )
        .bind(isbn)
        .fetch_optional(&self.executor)
        .await?;
        Ok(record)
    }

    pub async fn create(&self, payload: CreateBook) -> Result<Book> {
        payload.validate()?;
        let payload = payload.normalized();

        if self.find_by_isbn(&payload.isbn).await?.is_some() {
            debug!(isbn = %payload.isbn, "Create rejected, ISBN already used");
            return Err(Error::DuplicateIsbn(payload.isbn));
        }

        let result = sqlx::query(
            "INSERT INTO book (title, author, isbn, publication_year, genre) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&payload.title)
        .bind(&payload.author)
        .bind(&payload.isbn)
        .bind(payload.publication_year)
        .bind(&payload.genre)
        .execute(&self.executor)
        .await
        .map_err(|e| write_error(e, &payload.isbn))?;

        let id = result.last_insert_rowid();
        self.get(id).await
    }

    /// Replaces all mutable fields of the book.
    pub async fn update(&self, id: i64, payload: CreateBook) -> Result<Book> {
        payload.validate()?;
        let payload = payload.normalized();

        self.get(id).await?;

        let other = sqlx::query_scalar::<_, i64>("SELECT id FROM book WHERE isbn = ? AND id <> ?")
            .bind(&payload.isbn)
            .bind(id)
            .fetch_optional(&self.executor)
            .await?;
        if let Some(other_id) = other {
            debug!(id, other_id, isbn = %payload.isbn, "Update rejected, ISBN used by other book");
            return Err(Error::DuplicateIsbn(payload.isbn));
        }

        let result = sqlx::query(
            "UPDATE book SET title = ?, author = ?, isbn = ?, publication_year = ?, genre = ?, \
             updated_at = CURRENT_TIMESTAMP WHERE id = ?",
        )
        .bind(&payload.title)
        .bind(&payload.author)
        .bind(&payload.isbn)
        .bind(payload.publication_year)
        .bind(&payload.genre)
        .bind(id)
        .execute(&self.executor)
        .await
        .map_err(|e| write_error(e, &payload.isbn))?;

        if result.rows_affected() == 0 {
            // deleted between the check and the write
            Err(Error::RecordNotFound(format!("Book {id}")))
        } else {
            self.get(id).await
        }
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        let res = sqlx::query("DELETE FROM book WHERE id = ?")
            .bind(id)
            .execute(&self.executor)
            .await?;

        if res.rows_affected() == 0 {
            Err(Error::RecordNotFound(format!("Book {id}")))
        } else {
            Ok(())
        }
    }
}
