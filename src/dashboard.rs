//!
//! # Dashboard state
//!
//! Pure state model for the dashboard page and the team-management
//! panel. The HTTP layer (or a UI embedding this crate) performs the
//! actual fetches; this module owns the orchestration rules:
//!
//! - which lookup a session uses (author vs. member view),
//! - preserving the selected project by id across refreshes,
//! - discarding stale refresh responses via a generation counter,
//! - optimistic metadata edits with a rollback snapshot, applying the
//!   server response as the source of truth,
//! - the team panel's local application list and its single shared
//!   error string.

use uuid::Uuid;

use crate::models::{Application, ApplicationStatus, Project, Subtask};
use crate::session::SessionContext;

/// State of the dashboard page: the session's project list and the
/// currently selected project.
#[derive(Debug)]
pub struct DashboardState {
    session: SessionContext,
    projects: Vec<Project>,
    selected_id: Option<Uuid>,
    // Generation of the most recently started refresh. Only a response
    // carrying this generation may be applied; anything older lost the
    // race and is dropped.
    latest_generation: u64,
    edit_snapshot: Option<Project>,
}

impl DashboardState {
    pub fn new(session: SessionContext) -> Self {
        Self {
            session,
            projects: Vec::new(),
            selected_id: None,
            latest_generation: 0,
            edit_snapshot: None,
        }
    }

    pub fn session(&self) -> &SessionContext {
        &self.session
    }

    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    /// The currently selected project, if any.
    pub fn selected(&self) -> Option<&Project> {
        let id = self.selected_id?;
        self.projects.iter().find(|p| p.id == id)
    }

    /// Path of the list endpoint this session refreshes from.
    pub fn refresh_path(&self) -> String {
        self.session.dashboard_path()
    }

    /// Starts a refresh and returns its generation token. The caller
    /// passes the token back to [`apply_refresh`](Self::apply_refresh)
    /// together with the fetched list.
    pub fn begin_refresh(&mut self) -> u64 {
        self.latest_generation += 1;
        self.latest_generation
    }

    /// Applies a fetched project list, unless a newer refresh has been
    /// started since `generation` was issued. Returns whether the
    /// response was applied.
    ///
    /// Selection rule: the previously selected project is preserved by
    /// id when still present, otherwise the first project is selected;
    /// an empty list clears the selection.
    pub fn apply_refresh(&mut self, generation: u64, projects: Vec<Project>) -> bool {
        if generation != self.latest_generation {
            return false;
        }

        self.selected_id = self
            .selected_id
            .filter(|id| projects.iter().any(|p| p.id == *id))
            .or_else(|| projects.first().map(|p| p.id));
        self.projects = projects;
        true
    }

    /// Selects a project by id. No-op (returning false) for ids not in
    /// the current list.
    pub fn select(&mut self, id: Uuid) -> bool {
        if self.projects.iter().any(|p| p.id == id) {
            self.selected_id = Some(id);
            true
        } else {
            false
        }
    }

    /// Snapshots the selected project ahead of a metadata mutation so a
    /// failed save can roll back. Returns false when nothing is
    /// selected.
    pub fn begin_project_edit(&mut self) -> bool {
        match self.selected().cloned() {
            Some(project) => {
                self.edit_snapshot = Some(project);
                true
            }
            None => false,
        }
    }

    /// Applies an optimistic local edit while the save request is in
    /// flight. The rollback snapshot is kept so a failed save can undo
    /// this write.
    pub fn apply_local_edit(&mut self, updated: Project) {
        if let Some(slot) = self.projects.iter_mut().find(|p| p.id == updated.id) {
            *slot = updated;
        }
    }

    /// Applies the server's response to a successful metadata save. The
    /// response is the source of truth: it replaces the matching entry
    /// in the project list. Drops the rollback snapshot.
    pub fn apply_project_save(&mut self, updated: Project) {
        self.apply_local_edit(updated);
        self.edit_snapshot = None;
    }

    /// Restores the pre-edit snapshot after a failed metadata save.
    /// Returns whether a snapshot existed.
    pub fn rollback_project_edit(&mut self) -> bool {
        match self.edit_snapshot.take() {
            Some(snapshot) => {
                if let Some(slot) = self.projects.iter_mut().find(|p| p.id == snapshot.id) {
                    *slot = snapshot;
                }
                true
            }
            None => false,
        }
    }

    /// Merges a saved subtask slice into the selected project without a
    /// full re-fetch. Resource saves intentionally have no counterpart:
    /// that path re-fetches the whole list.
    pub fn apply_subtasks_save(&mut self, project_id: Uuid, subtasks: Vec<Subtask>) {
        if let Some(slot) = self.projects.iter_mut().find(|p| p.id == project_id) {
            slot.subtasks = subtasks;
        }
    }
}

/// Local state of the team-management panel: the pending application
/// list, a loading flag, and one shared error string. There is no
/// per-row error isolation; any failure overwrites the shared message.
#[derive(Debug, Default)]
pub struct TeamPanel {
    applications: Vec<Application>,
    loading: bool,
    error: Option<String>,
}

impl TeamPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn applications(&self) -> &[Application] {
        &self.applications
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Marks the applications fetch as in flight.
    pub fn begin_load(&mut self) {
        self.loading = true;
    }

    /// Stores a fetched application list.
    pub fn load_ok(&mut self, applications: Vec<Application>) {
        self.applications = applications;
        self.loading = false;
        self.error = None;
    }

    /// Records a failed fetch. The list stays renderable (empty or the
    /// previous contents) and the error string is guaranteed non-empty.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.error = Some(if message.is_empty() {
            "Failed to load applications".to_string()
        } else {
            message
        });
        self.loading = false;
    }

    /// Applies a successful accept/reject to the local list: exactly the
    /// matching application's status changes, all others are untouched.
    /// Returns true when a row was updated, signalling that one parent
    /// project refresh is due.
    pub fn resolve(&mut self, id: Uuid, status: ApplicationStatus) -> bool {
        if !status.is_resolution() {
            return false;
        }
        match self.applications.iter_mut().find(|a| a.id == id) {
            Some(application) => {
                application.status = status;
                true
            }
            None => false,
        }
    }

    /// Records a failed accept/reject in the shared error string.
    pub fn resolve_failed(&mut self, message: impl Into<String>) {
        let message = message.into();
        self.error = Some(if message.is_empty() {
            "Failed to update status".to_string()
        } else {
            message
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Applicant, User};
    use crate::session::Role;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn user(name: &str) -> User {
        User {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: format!("{}@example.edu", name.to_lowercase()),
            created_at: Utc::now(),
        }
    }

    fn project(title: &str) -> Project {
        let author = user("Prof");
        Project {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: "desc".to_string(),
            requirement_tags: vec!["Rust".to_string()],
            deadline_to_complete: Utc::now(),
            author_id: author.id,
            created_at: Utc::now(),
            subtasks: vec![],
            author,
            members: vec![],
            project_resources: vec![],
        }
    }

    fn application(name: &str) -> Application {
        Application {
            id: Uuid::new_v4(),
            project_id: Uuid::new_v4(),
            applicant: Applicant {
                name: name.to_string(),
                email: format!("{}@example.edu", name.to_lowercase()),
            },
            status: ApplicationStatus::Pending,
            date_of_application: Utc::now(),
        }
    }

    fn state() -> DashboardState {
        DashboardState::new(SessionContext::new(Uuid::new_v4(), Role::Author))
    }

    #[test]
    fn test_first_refresh_selects_first_project() {
        let mut state = state();
        let (a, b) = (project("A"), project("B"));
        let a_id = a.id;

        let generation = state.begin_refresh();
        assert!(state.apply_refresh(generation, vec![a, b]));
        assert_eq!(state.selected().unwrap().id, a_id);
    }

    #[test]
    fn test_refresh_preserves_selection_by_id() {
        let mut state = state();
        let (a, b) = (project("A"), project("B"));
        let b_id = b.id;

        let generation = state.begin_refresh();
        state.apply_refresh(generation, vec![a.clone(), b.clone()]);
        assert!(state.select(b_id));

        // Refresh returns the projects in a different order; the
        // selection sticks to the id, not the index.
        let generation = state.begin_refresh();
        state.apply_refresh(generation, vec![b, a]);
        assert_eq!(state.selected().unwrap().id, b_id);
    }

    #[test]
    fn test_refresh_falls_back_to_first_when_selection_gone() {
        let mut state = state();
        let (a, b) = (project("A"), project("B"));
        let (a_id, b_id) = (a.id, b.id);

        let generation = state.begin_refresh();
        state.apply_refresh(generation, vec![a.clone(), b]);
        state.select(b_id);

        let generation = state.begin_refresh();
        state.apply_refresh(generation, vec![a]);
        assert_eq!(state.selected().unwrap().id, a_id);

        let generation = state.begin_refresh();
        state.apply_refresh(generation, vec![]);
        assert!(state.selected().is_none());
    }

    #[test]
    fn test_stale_refresh_is_discarded() {
        let mut state = state();
        let fresh = project("Fresh");
        let fresh_id = fresh.id;

        let stale_generation = state.begin_refresh();
        let fresh_generation = state.begin_refresh();

        // The newer request resolves first.
        assert!(state.apply_refresh(fresh_generation, vec![fresh]));
        // The older response arrives late and must not overwrite it.
        assert!(!state.apply_refresh(stale_generation, vec![project("Stale")]));

        assert_eq!(state.projects().len(), 1);
        assert_eq!(state.selected().unwrap().id, fresh_id);
    }

    #[test]
    fn test_select_unknown_id_is_rejected() {
        let mut state = state();
        let generation = state.begin_refresh();
        state.apply_refresh(generation, vec![project("A")]);

        assert!(!state.select(Uuid::new_v4()));
        assert_eq!(state.selected().unwrap().title, "A");
    }

    #[test]
    fn test_project_save_applies_server_response() {
        let mut state = state();
        let original = project("Before");

        let generation = state.begin_refresh();
        state.apply_refresh(generation, vec![original.clone()]);
        assert!(state.begin_project_edit());

        let mut updated = original;
        updated.title = "After".to_string();
        state.apply_project_save(updated);

        assert_eq!(state.selected().unwrap().title, "After");
        assert_eq!(state.projects()[0].title, "After");
        // The snapshot was consumed; a rollback now is a no-op.
        assert!(!state.rollback_project_edit());
    }

    #[test]
    fn test_failed_save_rolls_back_to_snapshot() {
        let mut state = state();
        let original = project("Original");

        let generation = state.begin_refresh();
        state.apply_refresh(generation, vec![original.clone()]);
        assert!(state.begin_project_edit());

        // Optimistic local write while the save is in flight, then the
        // server rejects the mutation.
        let mut optimistic = original.clone();
        optimistic.title = "Optimistic".to_string();
        state.apply_local_edit(optimistic);
        assert_eq!(state.selected().unwrap().title, "Optimistic");

        assert!(state.rollback_project_edit());
        assert_eq!(state.selected().unwrap().title, "Original");
    }

    #[test]
    fn test_subtask_slice_merge() {
        let mut state = state();
        let p = project("P");
        let id = p.id;

        let generation = state.begin_refresh();
        state.apply_refresh(generation, vec![p]);

        let slice = vec![Subtask {
            id: Uuid::new_v4(),
            project_id: id,
            title: "Write survey".to_string(),
            due_date: None,
            is_completed: false,
            position: 0,
        }];
        state.apply_subtasks_save(id, slice.clone());
        assert_eq!(state.selected().unwrap().subtasks, slice);
    }

    #[test]
    fn test_accept_updates_only_that_application() {
        let mut panel = TeamPanel::new();
        let (a, b) = (application("Ann"), application("Ben"));
        let a_id = a.id;

        panel.begin_load();
        panel.load_ok(vec![a, b]);
        assert!(!panel.is_loading());

        assert!(panel.resolve(a_id, ApplicationStatus::Accepted));
        assert_eq!(panel.applications()[0].status, ApplicationStatus::Accepted);
        assert_eq!(panel.applications()[1].status, ApplicationStatus::Pending);
    }

    #[test]
    fn test_reject_signals_exactly_one_refresh() {
        let mut panel = TeamPanel::new();
        let app = application("Cam");
        let id = app.id;
        panel.load_ok(vec![app]);

        let mut refreshes = 0;
        if panel.resolve(id, ApplicationStatus::Rejected) {
            refreshes += 1;
        }
        assert_eq!(refreshes, 1);
        assert_eq!(panel.applications()[0].status, ApplicationStatus::Rejected);

        // Resolving to PENDING is not a resolution and signals nothing.
        assert!(!panel.resolve(id, ApplicationStatus::Pending));
    }

    #[test]
    fn test_failed_fetch_keeps_panel_renderable() {
        let mut panel = TeamPanel::new();
        panel.begin_load();
        panel.load_failed("Failed to fetch applications");

        assert!(!panel.is_loading());
        assert!(panel.applications().is_empty());
        let error = panel.error().unwrap();
        assert!(!error.is_empty());

        // Blank failure messages still surface something readable.
        panel.load_failed("");
        assert!(!panel.error().unwrap().is_empty());
    }

    #[test]
    fn test_mutation_failure_shares_single_error_string() {
        let mut panel = TeamPanel::new();
        let (a, b) = (application("Dee"), application("Eli"));
        panel.load_ok(vec![a, b]);

        panel.resolve_failed("Failed to update application status");
        assert_eq!(panel.error(), Some("Failed to update application status"));

        // A second failure overwrites the shared message.
        panel.resolve_failed("Failed again");
        assert_eq!(panel.error(), Some("Failed again"));
    }
}
