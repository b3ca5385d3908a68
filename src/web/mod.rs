use std::{net::SocketAddr, sync::Arc};

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use crate::{bootstrap::Bootstrap, projects::Projects, storage::Storage};

mod forms;
mod handlers;
mod layers;
pub mod views;

use handlers::{
    add_project, add_project_form, delete_project, edit_project, edit_project_form, index,
    list_projects, not_found,
};
use views::Renderer;

pub const PROJECTS_PATH: &str = "/solutions/projects";

#[derive(Clone)]
pub struct AppState<S> {
    pub projects: Projects<S>,
    pub bootstrap: Bootstrap<S>,
    pub renderer: Arc<dyn Renderer + Send + Sync>,
}

impl<S: Storage + Clone + Send + Sync + 'static> AppState<S> {
    pub fn new<R: Renderer + Send + Sync + 'static>(storage: S, renderer: R) -> Self {
        let projects = Projects::new(storage);
        Self {
            bootstrap: Bootstrap::new(projects.clone()),
            projects,
            renderer: Arc::new(renderer),
        }
    }
}

pub fn router<S: Storage + Clone + Send + Sync + 'static>(state: AppState<S>) -> Router {
    Router::new()
        .route("/", get(index))
        .route(PROJECTS_PATH, get(list_projects::<S>))
        .route(
            "/solutions/addProject",
            get(add_project_form::<S>).post(add_project::<S>),
        )
        .route("/solutions/editProject/:id", get(edit_project_form::<S>))
        .route("/solutions/editProject", post(edit_project::<S>))
        .route("/solutions/deleteProject/:id", get(delete_project::<S>))
        .fallback(not_found::<S>)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            layers::ensure_initialized::<S>,
        ))
        .layer(middleware::from_fn(layers::log_requests))
        .with_state(state)
}

pub async fn serve<S: Storage + Clone + Send + Sync + 'static>(
    addr: SocketAddr,
    state: AppState<S>,
    shutdown: tokio_util::sync::CancellationToken,
) -> anyhow::Result<()> {
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("🌐 Server listening on: http://{}", listener.local_addr()?);
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown.cancelled().await;
            log::info!("🛑 HTTP shutdown requested");
        })
        .await?;
    log::info!("👋 HTTP server exited");
    Ok(())
}
