use clap::Parser;
use tracing::info;

use crate::commands::{print_message, BookArgs, Executor};
use crate::session::Session;

#[derive(Parser, Debug)]
pub struct EditCmd {
    #[arg(help = "Id of the book")]
    pub id: i64,
    #[command(flatten)]
    pub book: BookArgs,
}

impl Executor for EditCmd {
    async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        session.edit(self.id).await?;
        self.book.apply(&mut session.view_mut().form.book);

        let book = session.submit().await?;
        info!(id = book.id, "Updated book");
        print_message(session);
        Ok(())
    }
}
