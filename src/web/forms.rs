use serde::Deserialize;

use crate::storage::{ProjectFields, StoreError};

/// Body of `POST /solutions/addProject`. Every field arrives as text; browsers
/// send empty strings for untouched inputs.
#[derive(Debug, Default, Deserialize)]
pub struct ProjectForm {
    pub title: Option<String>,
    pub feature_img_url: Option<String>,
    pub summary_short: Option<String>,
    pub intro_short: Option<String>,
    pub impact: Option<String>,
    pub original_source_url: Option<String>,
    pub sector_id: Option<String>,
}

/// Body of `POST /solutions/editProject`: the target id plus the same fields
/// as [`ProjectForm`].
#[derive(Debug, Default, Deserialize)]
pub struct EditProjectForm {
    pub id: Option<String>,
    pub title: Option<String>,
    pub feature_img_url: Option<String>,
    pub summary_short: Option<String>,
    pub intro_short: Option<String>,
    pub impact: Option<String>,
    pub original_source_url: Option<String>,
    pub sector_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ProjectsQuery {
    pub sector: Option<String>,
}

impl EditProjectForm {
    pub fn into_parts(self) -> Result<(i64, ProjectFields), StoreError> {
        let id = match self.id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => parse_id(raw)
                .ok_or_else(|| StoreError::Validation("id must be an integer".to_string()))?,
            _ => return Err(StoreError::Validation("id is required".to_string())),
        };
        let fields: ProjectFields = ProjectForm {
            title: self.title,
            feature_img_url: self.feature_img_url,
            summary_short: self.summary_short,
            intro_short: self.intro_short,
            impact: self.impact,
            original_source_url: self.original_source_url,
            sector_id: self.sector_id,
        }
        .try_into()?;
        Ok((id, fields))
    }
}

impl TryFrom<ProjectForm> for ProjectFields {
    type Error = StoreError;

    fn try_from(form: ProjectForm) -> Result<Self, Self::Error> {
        let sector_id = match form.sector_id.as_deref().map(str::trim) {
            Some(raw) if !raw.is_empty() => Some(parse_id(raw).ok_or_else(|| {
                StoreError::Validation("sector_id must be an integer".to_string())
            })?),
            _ => None,
        };
        Ok(ProjectFields {
            title: form.title,
            feature_img_url: form.feature_img_url,
            summary_short: form.summary_short,
            intro_short: form.intro_short,
            impact: form.impact,
            original_source_url: form.original_source_url,
            sector_id,
        })
    }
}

pub fn parse_id(raw: &str) -> Option<i64> {
    raw.trim().parse().ok()
}
