use std::path::Path;
use std::time::Duration;

use anyhow::{Result, anyhow};
use bookshelf_server::config::{Parser, ServerConfig};
use bookshelf_server::run::{build_state, run_graceful_with_state};
use rand::Rng as _;
use tempfile::TempDir;
use tokio::sync::oneshot;
use tracing::{error, info};
use url::Url;

pub mod rest;

pub const INDEX_PAGE: &str = "<html><body><h1>Bookshelf</h1></body></html>";

fn random_port() -> Result<u16> {
    let mut rng = rand::rng();

    let mut retries = 3;
    while retries > 0 {
        let port: u16 = rng.random_range(3030..4030);
        let addr: std::net::SocketAddr = format!("127.0.0.1:{}", port).parse()?;
        match std::net::TcpStream::connect_timeout(&addr, Duration::from_millis(100)) {
            Err(e) if e.kind() == std::io::ErrorKind::ConnectionRefused => return Ok(port),
            Err(_) => retries -= 1,
            Ok(_) => retries -= 1,
        }
    }

    Err(anyhow!("Could not find a free port"))
}

pub struct ConfigGuard {
    #[allow(dead_code)]
    data_dir: TempDir,
}

/// Server configuration with its own data and static directories, removed when the guard drops.
pub fn test_config(test_name: &str, base_dir: &Path) -> Result<(ServerConfig, ConfigGuard)> {
    let tmp_data_dir = TempDir::with_prefix_in(format!("{}_", test_name), base_dir)?;
    let static_dir = tmp_data_dir.path().join("public");
    std::fs::create_dir(&static_dir)?;
    std::fs::write(static_dir.join("index.html"), INDEX_PAGE)?;

    let data_dir = tmp_data_dir.path().to_string_lossy().to_string();
    let static_dir = static_dir.to_string_lossy().to_string();
    let port = random_port()?.to_string();
    let args = &[
        "bookshelf-e2e-tests",
        "--data-dir",
        &data_dir,
        "--static-dir",
        &static_dir,
        "--port",
        &port,
    ];
    let config = ServerConfig::try_parse_from(args)?;
    Ok((
        config,
        ConfigGuard {
            data_dir: tmp_data_dir,
        },
    ))
}

pub async fn prepare_env(test_name: &str) -> Result<(ServerConfig, ConfigGuard)> {
    test_config(test_name, &std::env::temp_dir())
}

/// Stops the spawned server when dropped.
pub struct ServerGuard {
    shutdown: Option<oneshot::Sender<()>>,
}

impl Drop for ServerGuard {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

/// Starts the server in background and waits until it answers on `/health`.
pub async fn spawn_server(args: ServerConfig) -> Result<(Url, ServerGuard)> {
    let base_url = args.base_url()?;
    let state = build_state(&args).await?;
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(async move {
        let shutdown = async move {
            let _ = rx.await;
        };
        if let Err(e) = run_graceful_with_state(args, state, shutdown).await {
            error!("Server error: {e}");
        }
    });

    let guard = ServerGuard { shutdown: Some(tx) };
    let health_url = base_url.join("health")?;
    let client = reqwest::Client::new();
    for _ in 0..50 {
        if let Ok(response) = client.get(health_url.clone()).send().await {
            if response.status().is_success() {
                info!("Test server running at {base_url}");
                return Ok((base_url, guard));
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }

    Err(anyhow!("Server did not start at {base_url}"))
}
