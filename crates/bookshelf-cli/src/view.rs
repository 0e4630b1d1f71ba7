use std::fmt::Display;
use std::time::{Duration, Instant};

use bookshelf_dal::book::{Book, CreateBook};

pub const FLASH_DURATION: Duration = Duration::from_secs(5);
pub const EMPTY_LIST: &str = "No books found";

const HEADERS: [&str; 6] = ["ID", "Title", "Author", "ISBN", "Year", "Genre"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Error,
}

/// Transient message, visible for [`FLASH_DURATION`] after it was shown.
#[derive(Debug, Clone)]
pub struct Flash {
    pub kind: FlashKind,
    pub text: String,
    shown: Instant,
}

impl Flash {
    fn new(kind: FlashKind, text: impl Into<String>) -> Self {
        Flash {
            kind,
            text: text.into(),
            shown: Instant::now(),
        }
    }

    pub fn is_visible_at(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.shown) < FLASH_DURATION
    }
}

/// Edit form, `id` is set while an existing book is being edited.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub id: Option<i64>,
    pub book: CreateBook,
}

impl BookForm {
    pub fn for_book(book: &Book) -> Self {
        BookForm {
            id: Some(book.id),
            book: book.clone().into(),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.id.is_some()
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_editing() { "Update" } else { "Add" }
    }

    pub fn action(&self) -> SubmitAction {
        match self.id {
            Some(id) => SubmitAction::Update(id, self.book.clone()),
            None => SubmitAction::Create(self.book.clone()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitAction {
    Create(CreateBook),
    Update(i64, CreateBook),
}

/// Client side state of the catalog: last loaded list, edit form, loading flag and flash message.
///
/// Failures never touch the list or the form, they only flash an error.
#[derive(Debug, Default)]
pub struct CatalogView {
    books: Vec<Book>,
    pub form: BookForm,
    loading: bool,
    flash: Option<Flash>,
}

impl CatalogView {
    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn start_loading(&mut self) {
        self.loading = true;
    }

    pub fn loaded(&mut self, books: Vec<Book>) {
        self.books = books;
        self.loading = false;
    }

    pub fn load_failed(&mut self, error: impl Display) {
        self.loading = false;
        self.flash_error(format!("Cannot load books: {error}"));
    }

    /// Ends loading with the previous list kept, the current message stays.
    pub fn refresh_failed(&mut self) {
        self.loading = false;
    }

    /// Fills the form from a listed book, returns false if the id is not in the list.
    pub fn begin_edit(&mut self, id: i64) -> bool {
        match self.books.iter().find(|b| b.id == id) {
            Some(book) => {
                self.form = BookForm::for_book(book);
                true
            }
            None => false,
        }
    }

    pub fn edit_book(&mut self, book: &Book) {
        self.form = BookForm::for_book(book);
    }

    pub fn cancel_edit(&mut self) {
        self.form = BookForm::default();
    }

    pub fn submitted(&mut self, action: &SubmitAction) {
        let text = match action {
            SubmitAction::Create(_) => "Book added",
            SubmitAction::Update(..) => "Book updated",
        };
        self.form = BookForm::default();
        self.flash_success(text);
    }

    pub fn flash_success(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash::new(FlashKind::Success, text));
    }

    pub fn flash_error(&mut self, text: impl Into<String>) {
        self.flash = Some(Flash::new(FlashKind::Error, text));
    }

    pub fn message(&self) -> Option<&Flash> {
        self.message_at(Instant::now())
    }

    pub fn message_at(&self, now: Instant) -> Option<&Flash> {
        self.flash.as_ref().filter(|f| f.is_visible_at(now))
    }

    pub fn render_table(&self) -> String {
        let rows: Vec<[String; 6]> = self.books.iter().map(row_cells).collect();
        let mut widths = HEADERS.map(str::len);
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        let mut out = String::new();
        push_row(&mut out, &HEADERS.map(String::from), &widths);
        let separator: Vec<_> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&separator.join("-+-"));
        out.push('\n');
        if rows.is_empty() {
            out.push_str(EMPTY_LIST);
            out.push('\n');
        }
        for row in &rows {
            push_row(&mut out, row, &widths);
        }
        out
    }
}

fn row_cells(book: &Book) -> [String; 6] {
    [
        book.id.to_string(),
        book.title.clone(),
        book.author.clone(),
        book.isbn.clone(),
        book.publication_year.map(|y| y.to_string()).unwrap_or_default(),
        book.genre.clone().unwrap_or_default(),
    ]
}

fn push_row(out: &mut String, cells: &[String], widths: &[usize]) {
    let line: Vec<_> = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
        .collect();
    out.push_str(line.join(" | ").trim_end());
    out.push('\n');
}

pub fn render_details(book: &Book) -> String {
    let optional = |v: Option<String>| v.unwrap_or_else(|| "-".to_string());
    format!(
        "ID:        {}\nTitle:     {}\nAuthor:    {}\nISBN:      {}\nYear:      {}\nGenre:     {}\nCreated:   {}\nUpdated:   {}\n",
        book.id,
        book.title,
        book.author,
        book.isbn,
        optional(book.publication_year.map(|y| y.to_string())),
        optional(book.genre.clone()),
        book.created_at,
        book.updated_at,
    )
}
