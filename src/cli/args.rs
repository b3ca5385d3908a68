use clap::Parser;
use std::env;

use crate::cli::command::Command;

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Browse and manage climate solution projects grouped by sector",
    long_about = "Serves the projects catalogue over HTTP, backed by a SQLite database.\n\nRun `seed` once to load the bundled sector and project fixtures.",
    subcommand_required = false,
    arg_required_else_help = false
)]
pub struct Cli {
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "sqlite://.solutions/solutions.sqlite",
        value_name = "URL",
        help = "Database location: sqlite://PATH, sqlite:PATH, file:///PATH or a plain path"
    )]
    pub database_url: String,

    #[arg(
        long,
        env = "HOST",
        default_value = "0.0.0.0",
        value_name = "ADDR",
        help = "Address to listen on"
    )]
    pub host: std::net::IpAddr,

    #[arg(
        short = 'p',
        long,
        env = "PORT",
        default_value_t = 8080u16,
        value_name = "PORT",
        help = "Port to listen on"
    )]
    pub port: u16,

    #[arg(
        long = "log-file",
        env = "SOLUTIONS_LOG_FILE",
        value_name = "PATH",
        help = "Write logs to PATH (in addition to stderr)"
    )]
    pub log_file: Option<String>,

    #[command(subcommand)]
    pub cmd: Option<Command>,
}

pub fn parse() -> Cli {
    let dotenv_path = env::var("DOTENV_PATH").unwrap_or(".env".into());
    dotenvy::from_filename(&dotenv_path).ok();

    Cli::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listen_flags_parse() {
        let cli = Cli::try_parse_from([
            "solutions",
            "--database-url",
            "db.sqlite",
            "--host",
            "127.0.0.1",
            "--port",
            "9000",
        ])
        .unwrap();
        assert_eq!(cli.port, 9000);
        assert_eq!(cli.host.to_string(), "127.0.0.1");
        assert_eq!(cli.database_url, "db.sqlite");
        assert!(cli.cmd.is_none());
    }

    #[test]
    fn rejects_non_numeric_port() {
        let err = Cli::try_parse_from(["solutions", "--port", "http"]).unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn seed_subcommand_takes_fixture_paths() {
        let cli = Cli::try_parse_from([
            "solutions",
            "--database-url",
            "db.sqlite",
            "seed",
            "--sectors",
            "s.json",
            "--projects",
            "p.json",
        ])
        .unwrap();
        match cli.cmd {
            Some(Command::Seed { sectors, projects }) => {
                assert_eq!(sectors.to_string_lossy(), "s.json");
                assert_eq!(projects.to_string_lossy(), "p.json");
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
