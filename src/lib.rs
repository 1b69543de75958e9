#![doc = "The `labforge` library crate."]
#![doc = ""]
#![doc = "Backend for a research-project collaboration dashboard: authors post"]
#![doc = "projects, students apply, authors accept or reject applicants, and"]
#![doc = "accepted teams track subtasks, timelines and learning resources."]
#![doc = "The crate contains the domain models, the HTTP route handlers, the"]
#![doc = "error handling, and the pure dashboard state model used by clients."]

pub mod config;
pub mod dashboard;
pub mod error;
pub mod models;
pub mod routes;
pub mod session;
