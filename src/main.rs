mod app;
mod bootstrap;
mod cli;
mod context;
mod projects;
mod seed;
mod storage;
mod tracing;
mod web;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    app::run().await
}
