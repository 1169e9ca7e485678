use crate::auth::auth::AuthUser;
use crate::model::action::ClockAction;
use crate::model::attendance::{AttendanceStatus, AttendanceView};
use crate::model::user::display_name;
use crate::service::{ClockOutcome, apply_action};
use crate::models::UserSql;
use crate::store::{AttendanceStore, UserStore};
use crate::utils::user_directory::UserDirectory;
use actix_web::{HttpResponse, Responder, web};
use chrono::Local;
use serde_json::json;
use std::str::FromStr;
use tracing::error;

/// Looks up the token's user, refusing users deactivated since the token was issued.
async fn active_user(
    auth: &AuthUser,
    users: &dyn UserStore,
    directory: &UserDirectory,
) -> actix_web::Result<UserSql> {
    let user = users.find_active(auth.user_id).await.map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to fetch user");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    match user {
        Some(user) => Ok(user),
        None => {
            directory.invalidate().await;
            Err(actix_web::error::ErrorForbidden("User is no longer active"))
        }
    }
}

/// Today's record of the authenticated user
#[utoipa::path(
    get,
    path = "/api/clock/today",
    responses(
        (status = 200, description = "Today's record (null when nothing was punched yet) and status", body = Object, example = json!({
            "date": "2026-01-05",
            "status": "clocked_in",
            "record": {
                "user_id": 1,
                "date": "2026-01-05",
                "clock_in_time": "09:00:00",
                "clock_out_time": null,
                "break_start_time": null,
                "break_end_time": null,
                "total_work_seconds": null,
                "total_break_seconds": 0,
                "status": "clocked_in"
            }
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "User is no longer active"),
        (status = 500, description = "Internal server error")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn today(
    auth: AuthUser,
    store: web::Data<dyn AttendanceStore>,
    users: web::Data<dyn UserStore>,
    directory: web::Data<UserDirectory>,
) -> actix_web::Result<impl Responder> {
    active_user(&auth, users.get_ref(), &directory).await?;

    let date = Local::now().date_naive();

    let record = store.find(auth.user_id, date).await.map_err(|e| {
        error!(error = %e, user_id = auth.user_id, "Failed to fetch today's record");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    let status = record
        .as_ref()
        .map(|r| r.status())
        .unwrap_or(AttendanceStatus::NotClockedIn);

    Ok(HttpResponse::Ok().json(json!({
        "date": date,
        "status": status,
        "record": record.as_ref().map(AttendanceView::from),
    })))
}

/// Punch the clock
#[utoipa::path(
    post,
    path = "/api/clock/{action}",
    params(
        ("action" = String, Path, description = "One of clock_in, clock_out, break_start, break_end")
    ),
    responses(
        (status = 200, description = "Action recorded", body = Object, example = json!({
            "message": "John Doe clocked in (09:00:00)",
            "time": "09:00:00",
            "record": {
                "user_id": 1,
                "date": "2026-01-05",
                "clock_in_time": "09:00:00",
                "status": "clocked_in"
            }
        })),
        (status = 400, description = "Unknown action, or the action is not allowed in the current state", body = Object, example = json!({
            "message": "Already clocked in",
            "reason": "already_clocked_in",
            "status": "clocked_in"
        })),
        (status = 401, description = "Unauthorized"),
        (status = 403, description = "User is no longer active"),
        (status = 500, description = "Internal server error", body = Object, example = json!({
            "message": "Something went wrong, contact the system admin"
        }))
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Clock"
)]
pub async fn clock_action(
    auth: AuthUser,
    path: web::Path<String>,
    store: web::Data<dyn AttendanceStore>,
    users: web::Data<dyn UserStore>,
    directory: web::Data<UserDirectory>,
) -> actix_web::Result<impl Responder> {
    let raw_action = path.into_inner();

    let action = match ClockAction::from_str(&raw_action) {
        Ok(a) => a,
        Err(_) => {
            return Ok(HttpResponse::BadRequest().json(json!({
                "message": format!("Unknown action: {}", raw_action)
            })));
        }
    };

    let user = active_user(&auth, users.get_ref(), &directory).await?;
    let name = display_name(&user.first_name, &user.last_name, &user.username);

    let now = Local::now().naive_local();

    match apply_action(store.get_ref(), auth.user_id, action, now).await {
        Ok(ClockOutcome::Recorded { time, record }) => Ok(HttpResponse::Ok().json(json!({
            "message": format!("{} {} ({})", name, action.past_tense(), time.format("%H:%M:%S")),
            "time": time,
            "record": AttendanceView::from(&record),
        }))),
        Ok(ClockOutcome::Rejected { reason, record }) => Ok(HttpResponse::BadRequest().json(json!({
            "message": reason.to_string(),
            "reason": reason,
            "status": record.status(),
        }))),
        Err(e) => {
            error!(
                error = %e,
                user_id = auth.user_id,
                action = action.as_ref(),
                "Clock action failed"
            );
            Ok(HttpResponse::InternalServerError().json(json!({
                "message": "Something went wrong, contact the system admin"
            })))
        }
    }
}
