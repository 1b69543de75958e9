pub mod applicants;
pub mod dashboard;
pub mod discover;
pub mod health;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/forDashboard")
            .service(dashboard::get_projects_by_author_id)
            .service(dashboard::get_projects_by_user_id)
            .service(dashboard::update_project)
            .service(dashboard::update_subtasks)
            .service(dashboard::update_resources),
    )
    .service(
        web::scope("/applicants")
            .service(applicants::list_applications)
            .service(applicants::create_application)
            .service(applicants::update_application_status),
    )
    .service(web::scope("/discover").service(discover::discover_projects));
}
