use std::{path::PathBuf, time::Duration};

use bookshelf_dal::{PoolSettings, DEFAULT_MAX_CONNECTIONS};
pub use clap::Parser;
use url::Url;

use crate::error::Result;

#[derive(Debug, Clone, clap::Parser)]
#[command(version, about = "Book catalog server - REST API and static web page")]
pub struct ServerConfig {
    #[arg(
        short,
        long,
        default_value_t = 3000,
        env = "PORT",
        help = "Port to listen on"
    )]
    pub port: u16,
    #[arg(
        short,
        long,
        default_value = "127.0.0.1",
        env = "BOOKSHELF_LISTEN_ADDRESS",
        help = "Address to listen on"
    )]
    pub listen_address: String,

    #[arg(
        long,
        env = "BOOKSHELF_DATABASE_URL",
        help = "Database URL e.g. sqlite://file.db, default is sqlite://[data-dir]/bookshelf.db, where data-dir is set by --data-dir"
    )]
    database_url: Option<String>,

    #[arg(
        long,
        env = "BOOKSHELF_DATA_DIR",
        help = "Data directory for the database, default is system default like ~/.local/share/bookshelf",
        default_value_t = default_data_dir()
    )]
    data_dir: String,

    #[arg(
        long,
        env = "BOOKSHELF_STATIC_DIR",
        default_value = "public",
        help = "Directory with static files, index.html from it is served on /"
    )]
    pub static_dir: PathBuf,

    #[arg(
        long,
        env = "BOOKSHELF_DB_MAX_CONNECTIONS",
        default_value_t = DEFAULT_MAX_CONNECTIONS,
        help = "Maximum number of database connections"
    )]
    pub db_max_connections: u32,

    #[arg(
        long,
        env = "BOOKSHELF_DB_ACQUIRE_TIMEOUT",
        default_value = "30s",
        help = "How long to wait for a free database connection, in human friendly format (e.g. 30s, 1m)",
        value_parser = humantime::parse_duration
    )]
    pub db_acquire_timeout: Duration,

    #[arg(long, env = "BOOKSHELF_NO_CORS", help = "Disable CORS")]
    pub no_cors: bool,
}

fn default_data_dir() -> String {
    dirs::data_dir()
        .map(|p| p.join("bookshelf"))
        .unwrap_or_else(|| PathBuf::from("bookshelf"))
        .to_string_lossy()
        .to_string()
}

impl ServerConfig {
    pub fn data_dir(&self) -> PathBuf {
        PathBuf::from(&self.data_dir)
    }

    pub fn database_url(&self) -> String {
        self.database_url
            .clone()
            .unwrap_or_else(|| format!("sqlite://{}/bookshelf.db", self.data_dir))
    }

    pub fn pool_settings(&self) -> PoolSettings {
        PoolSettings {
            max_connections: self.db_max_connections,
            acquire_timeout: self.db_acquire_timeout,
        }
    }

    /// URL under which the server is reachable locally.
    pub fn base_url(&self) -> Result<Url> {
        let url = Url::parse(&format!("http://{}:{}/", self.listen_address, self.port))?;
        Ok(url)
    }
}
