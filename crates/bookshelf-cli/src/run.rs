use crate::{client::BookClient, commands::Executor as _, config::CliConfig, session::Session};
use anyhow::Result;

pub async fn run(config: CliConfig) -> Result<()> {
    let client = BookClient::new(&config.server_url)?;
    let mut session = Session::new(client);
    config.command.run(&mut session).await
}
