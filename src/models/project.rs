use chrono::{DateTime, Utc};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::User;

lazy_static! {
    // Requirement tags: letters, digits, and common tech-name punctuation.
    static ref TAG_REGEX: regex::Regex = regex::Regex::new(r"^[A-Za-z0-9][A-Za-z0-9 ./+#_-]*$").unwrap();
}

/// A project row as stored, before its associations are attached.
#[derive(Debug, Clone, FromRow)]
pub struct ProjectRow {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub requirement_tags: Vec<String>,
    pub deadline_to_complete: DateTime<Utc>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A single item on a project's task timeline. `position` carries the
/// display order.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Subtask {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub due_date: Option<DateTime<Utc>>,
    pub is_completed: bool,
    pub position: i32,
}

/// A learning resource attached to a project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ProjectResource {
    pub id: Uuid,
    pub project_id: Uuid,
    pub title: String,
    pub url: String,
    pub position: i32,
}

/// A team member, serialized as `{"user": {...}}` to match the shape the
/// dashboard widgets consume.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectMember {
    pub user: User,
}

/// A project with its associations eagerly attached, as returned by the
/// dashboard lookups.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub requirement_tags: Vec<String>,
    pub deadline_to_complete: DateTime<Utc>,
    pub author_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub subtasks: Vec<Subtask>,
    pub author: User,
    pub members: Vec<ProjectMember>,
    pub project_resources: Vec<ProjectResource>,
}

impl Project {
    /// Attaches the eagerly loaded associations to a base row.
    pub fn hydrate(
        row: ProjectRow,
        subtasks: Vec<Subtask>,
        author: User,
        members: Vec<ProjectMember>,
        project_resources: Vec<ProjectResource>,
    ) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            requirement_tags: row.requirement_tags,
            deadline_to_complete: row.deadline_to_complete,
            author_id: row.author_id,
            created_at: row.created_at,
            subtasks,
            author,
            members,
            project_resources,
        }
    }
}

fn validate_requirement_tags(tags: &Vec<String>) -> Result<(), ValidationError> {
    if tags.len() > 20 {
        return Err(ValidationError::new("too_many_tags"));
    }
    for tag in tags {
        if tag.is_empty() || tag.len() > 30 || !TAG_REGEX.is_match(tag) {
            return Err(ValidationError::new("invalid_tag"));
        }
    }
    Ok(())
}

/// Payload of `PUT /api/forDashboard/updateProject`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdateInput {
    pub id: Uuid,

    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(length(min = 1, max = 2000))]
    pub description: String,

    #[validate(custom = "validate_requirement_tags")]
    pub requirement_tags: Vec<String>,

    pub deadline_to_complete: DateTime<Utc>,
}

/// One subtask in a timeline replacement. Position is taken from the
/// payload order, not sent by the client.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubtaskInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub is_completed: bool,
}

/// Payload of `PUT /api/forDashboard/updateSubtasks`: replaces the
/// project's whole timeline.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SubtasksUpdateInput {
    pub project_id: Uuid,

    #[validate]
    pub subtasks: Vec<SubtaskInput>,
}

/// One learning resource in a list replacement.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResourceInput {
    #[validate(length(min = 1, max = 200))]
    pub title: String,

    #[validate(url)]
    pub url: String,
}

/// Payload of `PUT /api/forDashboard/updateResources`.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ResourcesUpdateInput {
    pub project_id: Uuid,

    #[validate]
    pub resources: Vec<ResourceInput>,
}
