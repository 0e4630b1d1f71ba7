use clap::Parser;

use crate::commands::Executor;
use crate::session::Session;
use crate::view::render_details;

#[derive(Parser, Debug)]
pub struct ShowCmd {
    #[arg(help = "Id of the book")]
    pub id: i64,
}

impl Executor for ShowCmd {
    async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        let book = session.client().get(self.id).await?;
        print!("{}", render_details(&book));
        Ok(())
    }
}
