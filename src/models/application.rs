use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::models::Applicant;

/// Status of a student's application to join a project.
/// Corresponds to the `application_status` SQL enum. PENDING is the only
/// state a transition may leave; ACCEPTED and REJECTED are terminal.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "application_status", rename_all = "UPPERCASE")]
#[serde(rename_all = "UPPERCASE")]
pub enum ApplicationStatus {
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    /// True for the two terminal states an author may move an
    /// application into.
    pub fn is_resolution(self) -> bool {
        matches!(self, ApplicationStatus::Accepted | ApplicationStatus::Rejected)
    }
}

/// A flat application row joined with the applicant's user record.
#[derive(Debug, Clone, FromRow)]
pub struct ApplicationRow {
    pub id: Uuid,
    pub project_id: Uuid,
    pub applicant_id: Uuid,
    pub status: ApplicationStatus,
    pub date_of_application: DateTime<Utc>,
    pub applicant_name: String,
    pub applicant_email: String,
}

/// An application as the team modal consumes it, with the applicant
/// identity nested.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    pub id: Uuid,
    pub project_id: Uuid,
    pub applicant: Applicant,
    pub status: ApplicationStatus,
    pub date_of_application: DateTime<Utc>,
}

impl From<ApplicationRow> for Application {
    fn from(row: ApplicationRow) -> Self {
        Self {
            id: row.id,
            project_id: row.project_id,
            applicant: Applicant {
                name: row.applicant_name,
                email: row.applicant_email,
            },
            status: row.status,
            date_of_application: row.date_of_application,
        }
    }
}

/// Query parameters of `GET /api/applicants`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationQuery {
    pub project_id: Uuid,
    pub status: Option<ApplicationStatus>,
}

/// Payload of `PUT /api/applicants/{id}`.
#[derive(Debug, Deserialize)]
pub struct ApplicationStatusUpdate {
    pub status: ApplicationStatus,
}

/// Payload of `POST /api/applicants` (the Discover page's Apply action).
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationInput {
    pub project_id: Uuid,
    pub applicant_id: Uuid,
}
