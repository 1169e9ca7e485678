use crate::service::{Dashboard, build_dashboard};
use crate::store::AttendanceStore;
use crate::utils::user_directory::UserDirectory;
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use tracing::error;

/// Today's status of every active user
#[utoipa::path(
    get,
    path = "/api/dashboard",
    responses(
        (status = 200, description = "One row per active user plus counters", body = Dashboard),
        (status = 500, description = "Internal server error")
    ),
    tag = "Dashboard"
)]
pub async fn dashboard(
    directory: web::Data<UserDirectory>,
    store: web::Data<dyn AttendanceStore>,
) -> actix_web::Result<impl Responder> {
    let date = Local::now().date_naive();

    let users = directory.active_users().await.map_err(|e| {
        error!(error = %e, "Failed to load active users");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let records = store.for_date(date).await.map_err(|e| {
        error!(error = %e, %date, "Failed to load today's records");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(build_dashboard(date, &users, records)))
}
