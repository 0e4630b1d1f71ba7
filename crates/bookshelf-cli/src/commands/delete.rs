use std::io::{BufRead as _, Write as _};

use anyhow::Context as _;
use clap::Parser;

use crate::commands::{print_message, Executor};
use crate::session::Session;

#[derive(Parser, Debug)]
pub struct DeleteCmd {
    #[arg(help = "Id of the book")]
    pub id: i64,
    #[arg(short, long, help = "Do not ask for confirmation")]
    pub yes: bool,
}

impl Executor for DeleteCmd {
    async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        if !self.yes {
            let book = session.client().get(self.id).await?;
            let question = format!("Delete \"{}\" by {} (id {})?", book.title, book.author, book.id);
            if !confirm(&question)? {
                println!("Cancelled");
                return Ok(());
            }
        }

        session.delete(self.id).await?;
        print_message(session);
        Ok(())
    }
}

fn confirm(question: &str) -> anyhow::Result<bool> {
    print!("{question} [y/N] ");
    std::io::stdout().flush()?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Cannot read confirmation")?;
    Ok(is_yes(&answer))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}
