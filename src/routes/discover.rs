use crate::{error::AppError, routes::dashboard::hydrate_projects};
use actix_web::{get, web, HttpResponse, Responder};
use sqlx::PgPool;

use crate::models::ProjectRow;

/// The catalog behind the Discover page: every project, newest first,
/// hydrated the same way as the dashboard lookups so the cards can show
/// tags and author. Whether an Apply button is rendered is the client's
/// role hint; submission goes through `POST /api/applicants`.
#[get("")]
pub async fn discover_projects(pool: web::Data<PgPool>) -> Result<impl Responder, AppError> {
    let rows = sqlx::query_as::<_, ProjectRow>(
        "SELECT id, title, description, requirement_tags, deadline_to_complete, author_id, created_at \
         FROM projects ORDER BY created_at DESC",
    )
    .fetch_all(&**pool)
    .await?;

    let projects = hydrate_projects(&pool, rows).await?;
    Ok(HttpResponse::Ok().json(projects))
}
