use clap::Parser;
use tracing::info;

use crate::commands::{print_message, BookArgs, Executor};
use crate::session::Session;

#[derive(Parser, Debug)]
pub struct AddCmd {
    #[command(flatten)]
    pub book: BookArgs,
}

impl Executor for AddCmd {
    async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        let view = session.view_mut();
        view.cancel_edit();
        self.book.apply(&mut view.form.book);

        let book = session.submit().await?;
        info!(id = book.id, "Added book");
        print_message(session);
        println!("{}", book.id);
        Ok(())
    }
}
