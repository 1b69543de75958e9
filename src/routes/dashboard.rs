use crate::{
    error::AppError,
    models::{
        Project, ProjectMember, ProjectResource, ProjectRow, ProjectUpdateInput, ResourcesUpdateInput,
        Subtask, SubtasksUpdateInput, User,
    },
};
use actix_web::{get, put, web, HttpResponse, Responder};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use uuid::Uuid;
use validator::Validate;

const PROJECT_COLUMNS: &str =
    "id, title, description, requirement_tags, deadline_to_complete, author_id, created_at";

#[derive(Debug, FromRow)]
struct MemberRow {
    project_id: Uuid,
    id: Uuid,
    name: String,
    email: String,
    created_at: DateTime<Utc>,
}

fn index_by_project<T>(items: Vec<T>, project_id: impl Fn(&T) -> Uuid) -> HashMap<Uuid, Vec<T>> {
    let mut index: HashMap<Uuid, Vec<T>> = HashMap::new();
    for item in items {
        index.entry(project_id(&item)).or_default().push(item);
    }
    index
}

/// Attaches subtasks, author, members and resources to a set of project
/// rows. The four association queries run concurrently; rows are grouped
/// per project in memory. Sub-resource lists come back in display order.
pub(crate) async fn hydrate_projects(
    pool: &PgPool,
    rows: Vec<ProjectRow>,
) -> Result<Vec<Project>, AppError> {
    if rows.is_empty() {
        return Ok(Vec::new());
    }

    let project_ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
    let author_ids: Vec<Uuid> = rows.iter().map(|r| r.author_id).collect();

    let subtasks = sqlx::query_as::<_, Subtask>(
        "SELECT id, project_id, title, due_date, is_completed, position \
         FROM subtasks WHERE project_id = ANY($1) ORDER BY position",
    )
    .bind(&project_ids)
    .fetch_all(pool);

    let resources = sqlx::query_as::<_, ProjectResource>(
        "SELECT id, project_id, title, url, position \
         FROM project_resources WHERE project_id = ANY($1) ORDER BY position",
    )
    .bind(&project_ids)
    .fetch_all(pool);

    let authors = sqlx::query_as::<_, User>(
        "SELECT id, name, email, created_at FROM users WHERE id = ANY($1)",
    )
    .bind(&author_ids)
    .fetch_all(pool);

    let members = sqlx::query_as::<_, MemberRow>(
        "SELECT pm.project_id, u.id, u.name, u.email, u.created_at \
         FROM project_members pm JOIN users u ON u.id = pm.user_id \
         WHERE pm.project_id = ANY($1) ORDER BY pm.joined_at",
    )
    .bind(&project_ids)
    .fetch_all(pool);

    let (subtasks, resources, authors, members) =
        futures::try_join!(subtasks, resources, authors, members)?;

    let mut subtasks = index_by_project(subtasks, |s| s.project_id);
    let mut resources = index_by_project(resources, |r| r.project_id);
    let mut members = index_by_project(members, |m| m.project_id);
    let authors: HashMap<Uuid, User> = authors.into_iter().map(|u| (u.id, u)).collect();

    rows.into_iter()
        .map(|row| {
            let author = authors.get(&row.author_id).cloned().ok_or_else(|| {
                AppError::InternalServerError(format!("Author missing for project {}", row.id))
            })?;
            let members = members
                .remove(&row.id)
                .unwrap_or_default()
                .into_iter()
                .map(|m| ProjectMember {
                    user: User {
                        id: m.id,
                        name: m.name,
                        email: m.email,
                        created_at: m.created_at,
                    },
                })
                .collect();
            Ok(Project::hydrate(
                row.clone(),
                subtasks.remove(&row.id).unwrap_or_default(),
                author,
                members,
                resources.remove(&row.id).unwrap_or_default(),
            ))
        })
        .collect()
}

/// Retrieves all projects authored by a user, with subtasks, author,
/// members (with nested user) and resources eagerly loaded.
///
/// ## Responses:
/// - `200 OK`: JSON array of hydrated `Project` objects. An author with
///   no projects gets an empty array, never an error.
/// - `500 Internal Server Error`: For database errors; detail is logged
///   server-side only.
#[get("/byAuthorId/{id}")]
pub async fn get_projects_by_author_id(
    pool: web::Data<PgPool>,
    author_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT {} FROM projects WHERE author_id = $1 ORDER BY created_at DESC",
        PROJECT_COLUMNS
    ))
    .bind(author_id.into_inner())
    .fetch_all(&**pool)
    .await?;

    let projects = hydrate_projects(&pool, rows).await?;
    Ok(HttpResponse::Ok().json(projects))
}

/// Retrieves all projects where the user is a team member (the member
/// view of the dashboard). Same hydration and empty-list behaviour as
/// the author lookup.
#[get("/byUserId/{id}")]
pub async fn get_projects_by_user_id(
    pool: web::Data<PgPool>,
    user_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let rows = sqlx::query_as::<_, ProjectRow>(&format!(
        "SELECT p.{} FROM projects p \
         JOIN project_members pm ON pm.project_id = p.id \
         WHERE pm.user_id = $1 ORDER BY p.created_at DESC",
        PROJECT_COLUMNS.replace(", ", ", p.")
    ))
    .bind(user_id.into_inner())
    .fetch_all(&**pool)
    .await?;

    let projects = hydrate_projects(&pool, rows).await?;
    Ok(HttpResponse::Ok().json(projects))
}

/// Updates a project's metadata (title, description, requirement tags,
/// deadline) and returns the updated project, fully hydrated, so the
/// dashboard can merge it without a re-fetch.
///
/// ## Responses:
/// - `200 OK`: The updated hydrated `Project`.
/// - `404 Not Found`: Unknown project id.
/// - `422 Unprocessable Entity`: Validation failure on the payload.
#[put("/updateProject")]
pub async fn update_project(
    pool: web::Data<PgPool>,
    input: web::Json<ProjectUpdateInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;

    let row = sqlx::query_as::<_, ProjectRow>(&format!(
        "UPDATE projects \
         SET title = $1, description = $2, requirement_tags = $3, deadline_to_complete = $4 \
         WHERE id = $5 RETURNING {}",
        PROJECT_COLUMNS
    ))
    .bind(&input.title)
    .bind(&input.description)
    .bind(&input.requirement_tags)
    .bind(input.deadline_to_complete)
    .bind(input.id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    let mut projects = hydrate_projects(&pool, vec![row]).await?;
    // hydrate_projects returns exactly one project for one row
    let project = projects
        .pop()
        .ok_or_else(|| AppError::InternalServerError("Hydration produced no project".into()))?;

    Ok(HttpResponse::Ok().json(project))
}

async fn ensure_project_exists(pool: &PgPool, project_id: Uuid) -> Result<(), AppError> {
    sqlx::query_as::<_, (Uuid,)>("SELECT id FROM projects WHERE id = $1")
        .bind(project_id)
        .fetch_optional(pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;
    Ok(())
}

/// Replaces a project's subtask timeline with the submitted list.
/// Positions are assigned from payload order. Returns the updated
/// ordered slice for the caller to merge in place.
#[put("/updateSubtasks")]
pub async fn update_subtasks(
    pool: web::Data<PgPool>,
    input: web::Json<SubtasksUpdateInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let input = input.into_inner();
    ensure_project_exists(&pool, input.project_id).await?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM subtasks WHERE project_id = $1")
        .bind(input.project_id)
        .execute(&mut *tx)
        .await?;

    for (position, subtask) in input.subtasks.iter().enumerate() {
        sqlx::query(
            "INSERT INTO subtasks (project_id, title, due_date, is_completed, position) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(input.project_id)
        .bind(&subtask.title)
        .bind(subtask.due_date)
        .bind(subtask.is_completed)
        .bind(position as i32)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let subtasks = sqlx::query_as::<_, Subtask>(
        "SELECT id, project_id, title, due_date, is_completed, position \
         FROM subtasks WHERE project_id = $1 ORDER BY position",
    )
    .bind(input.project_id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(subtasks))
}

/// Replaces a project's learning-resource list with the submitted list.
/// Returns the updated ordered slice; the original caller re-fetches the
/// whole project list regardless.
#[put("/updateResources")]
pub async fn update_resources(
    pool: web::Data<PgPool>,
    input: web::Json<ResourcesUpdateInput>,
) -> Result<impl Responder, AppError> {
    input.validate()?;
    let input = input.into_inner();
    ensure_project_exists(&pool, input.project_id).await?;

    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM project_resources WHERE project_id = $1")
        .bind(input.project_id)
        .execute(&mut *tx)
        .await?;

    for (position, resource) in input.resources.iter().enumerate() {
        sqlx::query(
            "INSERT INTO project_resources (project_id, title, url, position) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(input.project_id)
        .bind(&resource.title)
        .bind(&resource.url)
        .bind(position as i32)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let resources = sqlx::query_as::<_, ProjectResource>(
        "SELECT id, project_id, title, url, position \
         FROM project_resources WHERE project_id = $1 ORDER BY position",
    )
    .bind(input.project_id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(resources))
}
