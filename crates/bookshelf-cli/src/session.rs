use bookshelf_dal::book::Book;
use tracing::{debug, warn};

use crate::client::{BookClient, Result};
use crate::view::{CatalogView, SubmitAction};

/// Drives the [`CatalogView`] with results of server calls.
///
/// Every mutation refreshes the list on success, failures only flash an error.
/// A failed refresh after a committed mutation keeps the old list and the success message.
pub struct Session {
    client: BookClient,
    view: CatalogView,
}

impl Session {
    pub fn new(client: BookClient) -> Self {
        Session {
            client,
            view: CatalogView::default(),
        }
    }

    pub fn client(&self) -> &BookClient {
        &self.client
    }

    pub fn view(&self) -> &CatalogView {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut CatalogView {
        &mut self.view
    }

    pub async fn load(&mut self) -> Result<()> {
        self.view.start_loading();
        match self.client.list().await {
            Ok(books) => {
                debug!(count = books.len(), "Loaded books");
                self.view.loaded(books);
                Ok(())
            }
            Err(e) => {
                self.view.load_failed(&e);
                Err(e)
            }
        }
    }

    async fn refresh(&mut self) {
        self.view.start_loading();
        match self.client.list().await {
            Ok(books) => self.view.loaded(books),
            Err(e) => {
                warn!("Cannot refresh book list: {e}");
                self.view.refresh_failed();
            }
        }
    }

    /// Puts the stored version of the book into the edit form.
    pub async fn edit(&mut self, id: i64) -> Result<()> {
        match self.client.get(id).await {
            Ok(book) => {
                self.view.edit_book(&book);
                Ok(())
            }
            Err(e) => {
                self.view.flash_error(e.to_string());
                Err(e)
            }
        }
    }

    /// Creates or updates the book from the form, depending on whether it carries an id.
    pub async fn submit(&mut self) -> Result<Book> {
        let action = self.view.form.action();
        let result = match &action {
            SubmitAction::Create(book) => self.client.create(book).await,
            SubmitAction::Update(id, book) => self.client.update(*id, book).await,
        };
        match result {
            Ok(book) => {
                self.view.submitted(&action);
                self.refresh().await;
                Ok(book)
            }
            Err(e) => {
                self.view.flash_error(e.to_string());
                Err(e)
            }
        }
    }

    pub async fn delete(&mut self, id: i64) -> Result<()> {
        match self.client.delete(id).await {
            Ok(message) => {
                if self.view.form.id == Some(id) {
                    self.view.cancel_edit();
                }
                self.view.flash_success(message);
                self.refresh().await;
                Ok(())
            }
            Err(e) => {
                self.view.flash_error(e.to_string());
                Err(e)
            }
        }
    }
}
