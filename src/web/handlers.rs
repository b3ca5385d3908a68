use axum::{
    extract::{rejection::FormRejection, Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    Form,
};

use crate::storage::{ProjectFields, Storage, StoreError};

use super::{
    forms::{parse_id, EditProjectForm, ProjectForm, ProjectsQuery},
    views::View,
    AppState, PROJECTS_PATH,
};

pub async fn index() -> Response {
    redirect_to_projects()
}

pub async fn list_projects<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Query(query): Query<ProjectsQuery>,
) -> Response {
    let result = match query.sector.as_deref() {
        Some(sector) if !sector.is_empty() => {
            state.projects.list_projects_by_sector_name(sector).await
        }
        _ => state.projects.list_projects().await,
    };

    match result {
        Ok(projects) => state.render(StatusCode::OK, View::Projects { projects }),
        Err(err) if err.is_not_found() => state.not_found_page(&err),
        Err(err) => state.error_page(&err),
    }
}

pub async fn add_project_form<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> Response {
    match state.projects.list_sectors().await {
        Ok(sectors) => state.render(StatusCode::OK, View::AddProject { sectors }),
        Err(err) => state.error_page(&err),
    }
}

pub async fn add_project<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    form: Result<Form<ProjectForm>, FormRejection>,
) -> Response {
    let result = match form.map_err(rejected_form).and_then(|Form(f)| ProjectFields::try_from(f)) {
        Ok(fields) => state.projects.create_project(fields).await.map(|_| ()),
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => redirect_to_projects(),
        Err(err) => state.error_page(&err),
    }
}

pub async fn edit_project_form<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Response {
    let Some(id) = parse_id(&id) else {
        log::warn!("Invalid project id {}", id);
        return state.not_found_page(&StoreError::NotFound(
            "Unable to find requested project".to_string(),
        ));
    };

    let result = tokio::try_join!(
        state.projects.get_project(id),
        state.projects.list_sectors()
    );
    match result {
        Ok((project, sectors)) => {
            state.render(StatusCode::OK, View::EditProject { project, sectors })
        }
        Err(err) if err.is_not_found() => state.not_found_page(&err),
        Err(err) => state.error_page(&err),
    }
}

pub async fn edit_project<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    form: Result<Form<EditProjectForm>, FormRejection>,
) -> Response {
    let result = match form.map_err(rejected_form).and_then(|Form(f)| f.into_parts()) {
        Ok((id, fields)) => state.projects.update_project(id, fields).await,
        Err(err) => Err(err),
    };

    match result {
        Ok(()) => redirect_to_projects(),
        Err(err) => state.error_page(&err),
    }
}

pub async fn delete_project<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
    Path(id): Path<String>,
) -> Response {
    let result = match parse_id(&id) {
        Some(id) => state.projects.delete_project(id).await,
        None => Err(StoreError::NotFound("No project deleted".to_string())),
    };

    match result {
        Ok(()) => redirect_to_projects(),
        Err(err) => state.error_page(&err),
    }
}

pub async fn not_found<S: Storage + Clone + Send + Sync + 'static>(
    State(state): State<AppState<S>>,
) -> Response {
    state.render(
        StatusCode::NOT_FOUND,
        View::NotFound {
            message: "Page not found".to_string(),
        },
    )
}

/// Text shown to the visitor for a failed operation. Raw database errors are
/// logged by the caller and never rendered.
pub fn user_message(err: &StoreError) -> String {
    match err {
        StoreError::NotFound(msg) => msg.clone(),
        StoreError::Validation(msg) => {
            format!("I'm sorry, but we have encountered the following error: {msg}")
        }
        StoreError::Initialization(_) => "Server initialization failed".to_string(),
        StoreError::Database(_) | StoreError::Task(_) => {
            "I'm sorry, but we have encountered an unexpected error".to_string()
        }
    }
}

fn rejected_form(rejection: FormRejection) -> StoreError {
    StoreError::Validation(rejection.body_text())
}

fn redirect_to_projects() -> Response {
    (StatusCode::FOUND, [(header::LOCATION, PROJECTS_PATH)]).into_response()
}

impl<S> AppState<S> {
    fn render(&self, status: StatusCode, view: View) -> Response {
        (status, Html(self.renderer.render(&view))).into_response()
    }

    fn not_found_page(&self, err: &StoreError) -> Response {
        log::info!("Not found: {err}");
        self.render(
            StatusCode::NOT_FOUND,
            View::NotFound {
                message: user_message(err),
            },
        )
    }

    fn error_page(&self, err: &StoreError) -> Response {
        log::error!("Request failed: {err:?}");
        self.render(
            StatusCode::INTERNAL_SERVER_ERROR,
            View::ServerError {
                message: user_message(err),
            },
        )
    }
}
