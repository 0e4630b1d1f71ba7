use bookshelf_dal::book::CreateBook;
use clap::Args;

use crate::session::Session;

pub mod add;
pub mod delete;
pub mod edit;
pub mod list;
pub mod show;

#[allow(async_fn_in_trait)]
pub trait Executor {
    async fn run(self, session: &mut Session) -> anyhow::Result<()>;
}

/// Book fields accepted by `add` and `edit`, values are checked by the server.
#[derive(Args, Debug, Default, Clone)]
pub struct BookArgs {
    #[arg(long, help = "Title of the book")]
    pub title: Option<String>,
    #[arg(long, help = "Author of the book")]
    pub author: Option<String>,
    #[arg(long, help = "ISBN of the book, must be unique in the catalog")]
    pub isbn: Option<String>,
    #[arg(long, help = "Year of publication")]
    pub year: Option<i64>,
    #[arg(long, help = "Genre of the book, empty value clears it")]
    pub genre: Option<String>,
}

impl BookArgs {
    pub fn apply(self, book: &mut CreateBook) {
        if let Some(title) = self.title {
            book.title = title;
        }
        if let Some(author) = self.author {
            book.author = author;
        }
        if let Some(isbn) = self.isbn {
            book.isbn = isbn;
        }
        if let Some(year) = self.year {
            book.publication_year = Some(year);
        }
        if let Some(genre) = self.genre {
            book.genre = Some(genre);
        }
    }
}

pub(crate) fn print_message(session: &Session) {
    if let Some(flash) = session.view().message() {
        println!("{}", flash.text);
    }
}
