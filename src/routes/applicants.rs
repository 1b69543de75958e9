use crate::{
    error::AppError,
    models::{
        Application, ApplicationInput, ApplicationQuery, ApplicationRow, ApplicationStatus,
        ApplicationStatusUpdate,
    },
};
use actix_web::{get, post, put, web, HttpResponse, Responder};
use sqlx::PgPool;
use uuid::Uuid;

const APPLICATION_COLUMNS: &str =
    "a.id, a.project_id, a.applicant_id, a.status, a.date_of_application, \
     u.name AS applicant_name, u.email AS applicant_email";

async fn fetch_application(pool: &PgPool, id: Uuid) -> Result<Option<Application>, AppError> {
    let row = sqlx::query_as::<_, ApplicationRow>(&format!(
        "SELECT {} FROM applications a JOIN users u ON u.id = a.applicant_id WHERE a.id = $1",
        APPLICATION_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Application::from))
}

/// Lists a project's applications, newest first, optionally filtered by
/// status. The team modal calls this with `status=PENDING`.
///
/// ## Query Parameters:
/// - `projectId` (required): The project whose applications to list.
/// - `status` (optional): One of `PENDING`, `ACCEPTED`, `REJECTED`.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Application` objects with the applicant's
///   name and email nested.
/// - `500 Internal Server Error`: For database errors.
#[get("")]
pub async fn list_applications(
    pool: web::Data<PgPool>,
    query: web::Query<ApplicationQuery>,
) -> Result<impl Responder, AppError> {
    let applications = if let Some(status) = query.status {
        sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications a JOIN users u ON u.id = a.applicant_id \
             WHERE a.project_id = $1 AND a.status = $2 \
             ORDER BY a.date_of_application DESC",
            APPLICATION_COLUMNS
        ))
        .bind(query.project_id)
        .bind(status)
        .fetch_all(&**pool)
        .await?
    } else {
        sqlx::query_as::<_, ApplicationRow>(&format!(
            "SELECT {} FROM applications a JOIN users u ON u.id = a.applicant_id \
             WHERE a.project_id = $1 ORDER BY a.date_of_application DESC",
            APPLICATION_COLUMNS
        ))
        .bind(query.project_id)
        .fetch_all(&**pool)
        .await?
    };

    let applications: Vec<Application> = applications.into_iter().map(Application::from).collect();
    Ok(HttpResponse::Ok().json(applications))
}

/// Submits a new application to a project (the Discover page's Apply
/// action). The application starts PENDING with the submission time as
/// its application date.
///
/// ## Responses:
/// - `201 Created`: The new `Application`.
/// - `400 Bad Request`: The applicant already has a pending application
///   for this project, or is the project's author.
/// - `404 Not Found`: Unknown project or applicant.
#[post("")]
pub async fn create_application(
    pool: web::Data<PgPool>,
    input: web::Json<ApplicationInput>,
) -> Result<impl Responder, AppError> {
    let project = sqlx::query_as::<_, (Uuid,)>("SELECT author_id FROM projects WHERE id = $1")
        .bind(input.project_id)
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("Project not found".into()))?;

    if project.0 == input.applicant_id {
        return Err(AppError::BadRequest(
            "Authors cannot apply to their own project".into(),
        ));
    }

    sqlx::query_as::<_, (Uuid,)>("SELECT id FROM users WHERE id = $1")
        .bind(input.applicant_id)
        .fetch_optional(&**pool)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    // The partial unique index on pending applications is the duplicate
    // guard; a lost race between two applies surfaces as a conflict
    // here rather than a second PENDING row.
    let inserted = sqlx::query_as::<_, (Uuid,)>(
        "INSERT INTO applications (project_id, applicant_id) VALUES ($1, $2) RETURNING id",
    )
    .bind(input.project_id)
    .bind(input.applicant_id)
    .fetch_one(&**pool)
    .await;

    let (id,) = match inserted {
        Ok(row) => row,
        Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
            return Err(AppError::BadRequest(
                "An application for this project is already pending".into(),
            ));
        }
        Err(error) => return Err(error.into()),
    };

    let application = fetch_application(&pool, id)
        .await?
        .ok_or_else(|| AppError::InternalServerError("Application vanished after insert".into()))?;

    Ok(HttpResponse::Created().json(application))
}

/// Resolves a pending application. ACCEPTED also adds the applicant to
/// the project's team; the status update and the membership insert
/// commit in one transaction so the dashboard never observes one
/// without the other.
///
/// ## Path Parameters:
/// - `id`: The application to resolve.
///
/// ## Request Body:
/// `{"status": "ACCEPTED"}` or `{"status": "REJECTED"}`.
///
/// ## Responses:
/// - `200 OK`: The updated `Application`.
/// - `400 Bad Request`: The requested status is `PENDING`, or the
///   application is already resolved (both branches are terminal).
/// - `404 Not Found`: Unknown application id.
#[put("/{id}")]
pub async fn update_application_status(
    pool: web::Data<PgPool>,
    application_id: web::Path<Uuid>,
    update: web::Json<ApplicationStatusUpdate>,
) -> Result<impl Responder, AppError> {
    let status = update.status;
    if !status.is_resolution() {
        return Err(AppError::BadRequest(
            "Status must be ACCEPTED or REJECTED".into(),
        ));
    }

    let application_id = application_id.into_inner();
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, (Uuid, Uuid, ApplicationStatus)>(
        "SELECT project_id, applicant_id, status FROM applications WHERE id = $1 FOR UPDATE",
    )
    .bind(application_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::NotFound("Application not found".into()))?;

    let (project_id, applicant_id, current_status) = current;
    if current_status != ApplicationStatus::Pending {
        return Err(AppError::BadRequest("Application already resolved".into()));
    }

    sqlx::query("UPDATE applications SET status = $1 WHERE id = $2")
        .bind(status)
        .bind(application_id)
        .execute(&mut *tx)
        .await?;

    if status == ApplicationStatus::Accepted {
        // Membership is derived from acceptance. The conflict guard
        // covers a member re-applying after leaving the team.
        sqlx::query(
            "INSERT INTO project_members (project_id, user_id) VALUES ($1, $2) \
             ON CONFLICT DO NOTHING",
        )
        .bind(project_id)
        .bind(applicant_id)
        .execute(&mut *tx)
        .await?;
    }

    tx.commit().await?;

    let application = fetch_application(&pool, application_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Application not found".into()))?;

    Ok(HttpResponse::Ok().json(application))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_update_payload() {
        let update: ApplicationStatusUpdate =
            serde_json::from_str(r#"{"status": "ACCEPTED"}"#).unwrap();
        assert_eq!(update.status, ApplicationStatus::Accepted);

        // Unknown statuses are rejected at deserialization.
        assert!(serde_json::from_str::<ApplicationStatusUpdate>(r#"{"status": "MAYBE"}"#).is_err());
    }

    #[test]
    fn test_query_params_are_camel_case() {
        let query: ApplicationQuery = serde_json::from_str(
            r#"{"projectId": "7b0e2b6e-9d0e-4f3a-8a44-0d2a6a0f0c11", "status": "PENDING"}"#,
        )
        .unwrap();
        assert_eq!(query.status, Some(ApplicationStatus::Pending));
    }
}
