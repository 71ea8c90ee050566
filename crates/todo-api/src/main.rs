//! # todo-api
//!
//! To-do backend binary. Loads settings, opens and migrates the `SQLite`
//! store, then serves the task API until ctrl-c.

#![deny(unsafe_code)]

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use todo_server::{ServerConfig, TodoServer};
use todo_service::TaskService;
use todo_settings::TodoSettings;
use todo_store::{ConnectionConfig, ConnectionPool};

/// Database path that selects a throwaway in-memory store.
const IN_MEMORY: &str = ":memory:";

/// To-do task server.
#[derive(Parser, Debug)]
#[command(name = "todo-api", about = "To-do task and comment API server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database, or `:memory:` (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Settings file. Defaults to `~/.todo/settings.json` when present.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset (overrides settings).
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    /// Fold command-line overrides into loaded settings.
    fn apply(&self, settings: &mut TodoSettings) {
        if let Some(host) = &self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(path) = &self.db_path {
            settings.database.path = path.display().to_string();
        }
        if let Some(level) = &self.log_level {
            settings.logging.level.clone_from(level);
        }
    }
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

/// Open the pool described by `settings` and bring its schema up to date.
fn open_store(settings: &TodoSettings) -> Result<ConnectionPool> {
    let config = ConnectionConfig {
        pool_size: settings.database.pool_size,
        busy_timeout_ms: settings.database.busy_timeout_ms,
        ..ConnectionConfig::default()
    };

    let pool = if settings.database.path == IN_MEMORY {
        tracing::warn!("using an in-memory database, tasks will not survive a restart");
        todo_store::new_in_memory(&config).context("Failed to open in-memory database")?
    } else {
        let path = todo_settings::expand_home(&settings.database.path);
        ensure_parent_dir(&path)?;
        let path_str = path.to_string_lossy();
        tracing::info!(path = %path_str, "opening database");
        todo_store::new_file(&path_str, &config)
            .with_context(|| format!("Failed to open database: {path_str}"))?
    };

    let conn = pool.get().context("Failed to get connection from pool")?;
    let applied = todo_store::run_migrations(&conn).context("Failed to run migrations")?;
    if applied > 0 {
        tracing::info!(applied, "database migrations applied");
    }
    Ok(pool)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut settings =
        todo_settings::load_settings(cli.settings.as_deref()).context("Failed to load settings")?;
    cli.apply(&mut settings);

    todo_core::logging::init_subscriber(&settings.logging.level);

    let pool = open_store(&settings)?;
    let service = TaskService::new(pool);

    let config = ServerConfig {
        host: settings.server.host.clone(),
        port: settings.server.port,
        cors_permissive: settings.server.cors_permissive,
    };
    let server = TodoServer::new(config, service);
    let (addr, handle) = server
        .listen()
        .await
        .context("Failed to bind HTTP listener")?;
    tracing::info!("todo api listening on http://{addr}");

    tokio::signal::ctrl_c()
        .await
        .context("Failed to listen for ctrl-c")?;

    tracing::info!("shutting down");
    server.shutdown().graceful_shutdown(vec![handle], None).await;
    tracing::info!("shutdown complete");
    Ok(())
}
