#![allow(dead_code)]

use std::io::{Read, Write};
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::{Duration, Instant};

use tempfile::TempDir;

pub fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("data").join(name)
}

pub fn database_path(data_dir: &TempDir) -> PathBuf {
    data_dir.path().join("solutions.sqlite")
}

/// Binary invocation isolated from any `.env` or environment overrides.
pub fn base_cmd(data_dir: &TempDir) -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_solutions"));
    cmd.env("DOTENV_PATH", data_dir.path().join("missing.env"))
        .env_remove("DATABASE_URL")
        .env_remove("HOST")
        .env_remove("PORT")
        .env_remove("SOLUTIONS_LOG_FILE")
        .arg("--database-url")
        .arg(format!("sqlite://{}", database_path(data_dir).display()));
    cmd
}

pub fn seed(data_dir: &TempDir) {
    let output = base_cmd(data_dir)
        .arg("seed")
        .arg("--sectors")
        .arg(fixture("sectorData.json"))
        .arg("--projects")
        .arg(fixture("projectData.json"))
        .output()
        .expect("run seed");
    assert!(output.status.success(), "{:?}", output);
}

pub fn free_port() -> u16 {
    std::net::TcpListener::bind("127.0.0.1:0")
        .and_then(|l| l.local_addr())
        .map(|addr| addr.port())
        .expect("pick free port")
}

/// Minimal HTTP/1.1 GET. Returns the raw response text.
pub fn http_get(port: u16, path: &str) -> std::io::Result<String> {
    let mut stream = TcpStream::connect(("127.0.0.1", port))?;
    stream.set_read_timeout(Some(Duration::from_secs(5)))?;
    write!(
        stream,
        "GET {} HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n",
        path
    )?;
    let mut response = String::new();
    stream.read_to_string(&mut response)?;
    Ok(response)
}

pub fn wait_for_http(port: u16, path: &str, timeout: Duration) -> String {
    let deadline = Instant::now() + timeout;
    loop {
        match http_get(port, path) {
            Ok(response) => return response,
            Err(_) if Instant::now() < deadline => std::thread::sleep(Duration::from_millis(100)),
            Err(e) => panic!("server on port {port} never answered: {e}"),
        }
    }
}
