use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, bail, Result};
use url::Url;

use crate::storage::SqliteStorage;

pub struct Context {
    pub database_path: PathBuf,
    pub listen: SocketAddr,
    pub log_file: Option<PathBuf>,
}

impl Context {
    pub fn from_cli(cli: &crate::cli::Cli) -> Result<Self> {
        Ok(Self {
            database_path: database_path(&cli.database_url)?,
            listen: SocketAddr::new(cli.host, cli.port),
            log_file: cli.log_file.as_ref().map(PathBuf::from),
        })
    }

    pub fn storage(&self) -> SqliteStorage {
        SqliteStorage::new(&self.database_path)
    }
}

/// Resolves `DATABASE_URL` to a SQLite file path.
pub fn database_path(database_url: &str) -> Result<PathBuf> {
    let trimmed = database_url.trim();
    if let Some(rest) = trimmed
        .strip_prefix("sqlite://")
        .or_else(|| trimmed.strip_prefix("sqlite:"))
    {
        return non_empty(rest, database_url);
    }

    match Url::parse(trimmed) {
        Ok(url) if url.scheme() == "file" => url
            .to_file_path()
            .map_err(|_| anyhow!("invalid file URL: {database_url}")),
        // Single-letter schemes are Windows drive letters, not URLs.
        Ok(url) if url.scheme().len() > 1 => {
            bail!("unsupported database URL scheme: {}", url.scheme())
        }
        _ => non_empty(trimmed, database_url),
    }
}

fn non_empty(path: &str, original: &str) -> Result<PathBuf> {
    if path.is_empty() {
        bail!("database URL has no path: {original:?}");
    }
    // Every store call opens its own connection, so an in-memory database
    // would be empty again on the next call.
    if path == ":memory:" || path.starts_with("file::memory:") {
        bail!("in-memory databases are not supported: {original:?}");
    }
    Ok(Path::new(path).to_path_buf())
}
