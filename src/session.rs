use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The viewer's role, which decides which dashboard lookup a client
/// should use. A cookie-derived hint in the original UI; here it is an
/// explicit field handed to the dashboard on initialization.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owns projects; may edit them and accept or reject applicants.
    Author,
    /// Joined a team through an accepted application.
    Member,
}

/// Identity context for a dashboard session. Replaces ambient state
/// (a hardcoded user id and an `isAuth` flag) with an explicit object
/// supplied by the authentication collaborator.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct SessionContext {
    pub user_id: Uuid,
    pub role: Role,
}

impl SessionContext {
    pub fn new(user_id: Uuid, role: Role) -> Self {
        Self { user_id, role }
    }

    /// Whether this session may use the author-only affordances
    /// (project edits, team management).
    pub fn is_author(&self) -> bool {
        self.role == Role::Author
    }

    /// Path of the project-list lookup for this session.
    pub fn dashboard_path(&self) -> String {
        match self.role {
            Role::Author => format!("/api/forDashboard/byAuthorId/{}", self.user_id),
            Role::Member => format!("/api/forDashboard/byUserId/{}", self.user_id),
        }
    }
}
