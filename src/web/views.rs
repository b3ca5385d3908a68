use crate::storage::{Project, Sector};

/// A named page plus the data it displays.
#[derive(Debug)]
pub enum View {
    Projects { projects: Vec<Project> },
    AddProject { sectors: Vec<Sector> },
    EditProject { project: Project, sectors: Vec<Sector> },
    NotFound { message: String },
    ServerError { message: String },
}

impl View {
    pub fn name(&self) -> &'static str {
        match self {
            View::Projects { .. } => "projects",
            View::AddProject { .. } => "addProject",
            View::EditProject { .. } => "editProject",
            View::NotFound { .. } => "404",
            View::ServerError { .. } => "500",
        }
    }
}

/// Turns a [`View`] into an HTML document. Swap in a templating engine by
/// implementing this.
pub trait Renderer {
    fn render(&self, view: &View) -> String;
}

/// Minimal built-in pages: one `<main data-view="...">` per view, all text escaped.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlRenderer;

impl Renderer for HtmlRenderer {
    fn render(&self, view: &View) -> String {
        let (title, body) = match view {
            View::Projects { projects } => ("Projects", projects_body(projects)),
            View::AddProject { sectors } => (
                "Add Project",
                project_form("/solutions/addProject", None, sectors),
            ),
            View::EditProject { project, sectors } => (
                "Edit Project",
                project_form("/solutions/editProject", Some(project), sectors),
            ),
            View::NotFound { message } => ("404", message_body("Not Found", message)),
            View::ServerError { message } => ("500", message_body("Error", message)),
        };

        format!(
            "<!DOCTYPE html>\n<html lang=\"en\">\n<head><meta charset=\"utf-8\"><title>{}</title></head>\n\
             <body>\n<main data-view=\"{}\">\n{}</main>\n</body>\n</html>\n",
            escape(title),
            view.name(),
            body
        )
    }
}

fn projects_body(projects: &[Project]) -> String {
    let mut out =
        String::from("<h1>Projects</h1>\n<a href=\"/solutions/addProject\">Add Project</a>\n");
    if projects.is_empty() {
        out.push_str("<p>No projects yet.</p>\n");
        return out;
    }
    out.push_str("<table>\n<tr><th>Title</th><th>Sector</th><th>Summary</th><th></th></tr>\n");
    for project in projects {
        out.push_str(&format!(
            "<tr data-id=\"{id}\"><td>{title}</td><td class=\"sector\">{sector}</td><td>{summary}</td>\
             <td><a href=\"/solutions/editProject/{id}\">Edit</a> \
             <a href=\"/solutions/deleteProject/{id}\">Delete</a></td></tr>\n",
            id = project.id,
            title = text(&project.title),
            sector = escape(project.sector_name().unwrap_or("")),
            summary = text(&project.summary_short),
        ));
    }
    out.push_str("</table>\n");
    out
}

fn project_form(action: &str, project: Option<&Project>, sectors: &[Sector]) -> String {
    let selected = project.and_then(|p| p.sector_id);

    let mut out = format!("<form method=\"post\" action=\"{action}\">\n");
    if let Some(project) = project {
        out.push_str(&format!(
            "<input type=\"hidden\" name=\"id\" value=\"{}\">\n",
            project.id
        ));
    }
    for (name, current) in [
        ("title", field(project, |p| &p.title)),
        ("feature_img_url", field(project, |p| &p.feature_img_url)),
        ("summary_short", field(project, |p| &p.summary_short)),
        ("intro_short", field(project, |p| &p.intro_short)),
        ("impact", field(project, |p| &p.impact)),
        ("original_source_url", field(project, |p| &p.original_source_url)),
    ] {
        out.push_str(&format!(
            "<label>{name} <input name=\"{name}\" value=\"{current}\"></label>\n"
        ));
    }
    out.push_str("<select name=\"sector_id\">\n");
    for sector in sectors {
        let marker = if selected == Some(sector.id) { " selected" } else { "" };
        out.push_str(&format!(
            "<option value=\"{}\"{}>{}</option>\n",
            sector.id,
            marker,
            text(&sector.sector_name)
        ));
    }
    out.push_str("</select>\n<button type=\"submit\">Save</button>\n</form>\n");
    out
}

fn field(project: Option<&Project>, pick: fn(&Project) -> &Option<String>) -> String {
    project.map(|p| text(pick(p))).unwrap_or_default()
}

fn message_body(heading: &str, message: &str) -> String {
    format!(
        "<h1>{}</h1>\n<p class=\"message\">{}</p>\n<a href=\"/solutions/projects\">Back to projects</a>\n",
        escape(heading),
        escape(message)
    )
}

fn text(value: &Option<String>) -> String {
    escape(value.as_deref().unwrap_or(""))
}

pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
