use clap::Parser;

use crate::commands::Executor;
use crate::session::Session;

#[derive(Parser, Debug)]
pub struct ListCmd {}

impl Executor for ListCmd {
    async fn run(self, session: &mut Session) -> anyhow::Result<()> {
        session.load().await?;
        print!("{}", session.view().render_table());
        Ok(())
    }
}
