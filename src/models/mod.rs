pub mod application;
pub mod project;
pub mod user;

pub use application::{
    Application, ApplicationInput, ApplicationQuery, ApplicationRow, ApplicationStatus,
    ApplicationStatusUpdate,
};
pub use project::{
    Project, ProjectMember, ProjectResource, ProjectRow, ProjectUpdateInput, ResourceInput,
    ResourcesUpdateInput, Subtask, SubtaskInput, SubtasksUpdateInput,
};
pub use user::{Applicant, User};
