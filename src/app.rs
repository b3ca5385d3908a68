use crate::{bootstrap::Bootstrap, cli, context, storage, web};
use anyhow::{Context as AnyhowContext, Result};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// The main application state.
/// Decoupled from CLI parsing to allow for easier testing.
pub struct App<S: storage::Storage = storage::SqliteStorage> {
    config: context::Context,
    state: web::AppState<S>,
    shutdown: CancellationToken,
}

impl App {
    /// Builds the App from CLI arguments: parses flags and env, installs
    /// logging, and resolves the database location.
    pub fn from_cli() -> Result<(App, cli::Cli, LogGuard)> {
        let cli = crate::cli::parse();
        let ctx = context::Context::from_cli(&cli).context("reading configuration")?;

        let guard = LogGuard(crate::tracing::init(ctx.log_file.as_deref()));
        log_startup_info(&ctx);

        init_data_dir(&ctx)?;
        let storage = ctx.storage();

        Ok((App::new(ctx, storage), cli, guard))
    }
}

impl<S: storage::Storage + Clone + Send + Sync + 'static> App<S> {
    fn new(config: context::Context, storage: S) -> Self {
        Self {
            config,
            state: web::AppState::new(storage, web::views::HtmlRenderer),
            shutdown: CancellationToken::new(),
        }
    }

    /// Main entry point for the server.
    pub async fn run_daemon(&self) -> Result<()> {
        // Schema must be ready before the listener accepts anything.
        self.bootstrap()
            .ensure_ready()
            .await
            .context("Unable to start server")?;

        let mut http_handle = self.spawn_http_server();
        self.wait_for_shutdown(&mut http_handle).await
    }

    fn bootstrap(&self) -> &Bootstrap<S> {
        &self.state.bootstrap
    }

    fn spawn_http_server(&self) -> JoinHandle<()> {
        let addr = self.config.listen;
        let state = self.state.clone();
        let token = self.shutdown.clone();

        tokio::spawn(async move {
            if let Err(e) = web::serve(addr, state, token).await {
                log::error!("HTTP server failed: {:#}", e);
            }
        })
    }

    async fn wait_for_shutdown(&self, http_task: &mut JoinHandle<()>) -> Result<()> {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => log::info!("🧨 Ctrl-C received, shutting down..."),
            _ = &mut *http_task => log::error!("HTTP task exited unexpectedly"),
        }

        self.shutdown.cancel();

        // Polling a completed JoinHandle again panics.
        if !http_task.is_finished() {
            let _ = http_task.await;
        }

        log::info!("✅ Shutdown complete");
        Ok(())
    }

    #[cfg(test)]
    fn projects(&self) -> &crate::projects::Projects<S> {
        &self.state.projects
    }
}

/// Keeps the non-blocking log writer alive for the life of the process.
pub struct LogGuard(#[allow(dead_code)] Option<tracing_appender::non_blocking::WorkerGuard>);

fn log_startup_info(ctx: &context::Context) {
    log::info!("🚀 Starting solutions");
    log::info!("📂 Database: {}", ctx.database_path.to_string_lossy());
    if let Some(path) = ctx.log_file.as_deref() {
        log::info!("📝 Log file: {}", path.to_string_lossy());
    }
}

fn init_data_dir(ctx: &context::Context) -> Result<()> {
    if let Some(dir) = ctx
        .database_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
    {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("creating data dir {}", dir.display()))?;
    }
    Ok(())
}

// --- Entry Point ---

pub async fn run() -> Result<()> {
    let (app, cli, _guard) = App::from_cli()?;

    // Handle one-shot commands
    if let Some(cmd) = &cli.cmd {
        return cmd.run(&app.config);
    }

    app.run_daemon().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bootstrap::tests::CountingStorage;
    use crate::storage::SqliteStorage;
    use std::sync::atomic::Ordering;
    use tempfile::TempDir;

    fn config(dir: &TempDir, port: u16) -> context::Context {
        context::Context {
            database_path: dir.path().join("solutions.sqlite"),
            listen: format!("127.0.0.1:{}", port).parse().unwrap(),
            log_file: None,
        }
    }

    #[test]
    fn init_data_dir_creates_parent() {
        let dir = TempDir::new().unwrap();
        let ctx = context::Context {
            database_path: dir.path().join("nested/deeper/solutions.sqlite"),
            listen: "127.0.0.1:0".parse().unwrap(),
            log_file: None,
        };
        init_data_dir(&ctx).unwrap();
        assert!(dir.path().join("nested/deeper").is_dir());
    }

    #[tokio::test]
    async fn run_daemon_fails_when_schema_cannot_sync() {
        let dir = TempDir::new().unwrap();
        let storage = CountingStorage::new(SqliteStorage::new(dir.path().join("solutions.sqlite")));
        storage.fail_syncs.store(1, Ordering::SeqCst);
        let app = App::new(config(&dir, 0), storage);

        let err = app.run_daemon().await.unwrap_err();
        assert!(err.to_string().contains("Unable to start server"));
        assert!(!app.bootstrap().is_ready());
    }

    #[tokio::test]
    async fn wait_for_shutdown_exits_when_task_finishes() {
        let dir = TempDir::new().unwrap();
        let app = App::new(config(&dir, 0), SqliteStorage::new(dir.path().join("db.sqlite")));

        let mut http_task = tokio::spawn(async {});
        let res = app.wait_for_shutdown(&mut http_task).await;
        assert!(res.is_ok());
        assert!(app.shutdown.is_cancelled());
    }

    #[tokio::test]
    async fn spawn_http_server_serves_projects_page() {
        let dir = TempDir::new().unwrap();
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let storage = SqliteStorage::new(dir.path().join("solutions.sqlite"));
        let app = App::new(config(&dir, port), storage);
        app.bootstrap().ensure_ready().await.unwrap();

        let handle = app.spawn_http_server();
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
        assert!(
            !handle.is_finished(),
            "HTTP server task finished unexpectedly (likely bind failed)"
        );

        let mut stream = tokio::net::TcpStream::connect(format!("127.0.0.1:{}", port))
            .await
            .expect("connect to HTTP server");

        use tokio::io::{AsyncReadExt, AsyncWriteExt};
        stream
            .write_all(
                b"GET /solutions/projects HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
            )
            .await
            .unwrap();

        let mut buffer = Vec::new();
        stream.read_to_end(&mut buffer).await.unwrap();
        let response = String::from_utf8_lossy(&buffer);

        assert!(response.contains("200 OK"));
        assert!(response.contains("data-view=\"projects\""));
        assert!(app.projects().list_projects().await.unwrap().is_empty());

        app.shutdown.cancel();
        let _ = handle.await;
    }
}
