use clap::{Parser, Subcommand};
use url::Url;

use crate::commands::{
    add::AddCmd, delete::DeleteCmd, edit::EditCmd, list::ListCmd, show::ShowCmd, Executor,
};
use crate::session::Session;

pub const DEFAULT_SERVER_URL: &str = "http://localhost:3000";

#[derive(Parser)]
#[command(
    version,
    about,
    long_about = "CLI for bookshelf - lists and manages books in the catalog through the server REST API."
)]
pub struct CliConfig {
    #[arg(
        long,
        global = true,
        env = "BOOKSHELF_SERVER_URL",
        default_value = DEFAULT_SERVER_URL,
        help = "Base URL of the bookshelf server"
    )]
    pub server_url: Url,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List all books, newest first
    List(ListCmd),
    /// Show details of one book
    Show(ShowCmd),
    /// Add a new book
    Add(AddCmd),
    /// Edit a book, only given fields are changed
    Edit(EditCmd),
    /// Delete a book
    Delete(DeleteCmd),
}

impl Executor for Command {
    async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        match self {
            Command::List(cmd) => cmd.run(session).await,
            Command::Show(cmd) => cmd.run(session).await,
            Command::Add(cmd) => cmd.run(session).await,
            Command::Edit(cmd) => cmd.run(session).await,
            Command::Delete(cmd) => cmd.run(session).await,
        }
    }
}
