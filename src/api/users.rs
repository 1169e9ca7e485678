use crate::model::user::UserProfile;
use crate::utils::user_directory::UserDirectory;
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use tracing::error;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct UserListResponse {
    pub data: Vec<UserProfile>,
}

/// Active users to pick from before entering a password
#[utoipa::path(
    get,
    path = "/users",
    responses(
        (status = 200, description = "Active users ordered by name", body = UserListResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Users"
)]
pub async fn list_users(directory: web::Data<UserDirectory>) -> actix_web::Result<impl Responder> {
    let users = directory.active_users().await.map_err(|e| {
        error!(error = %e, "Failed to load active users");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok().json(UserListResponse {
        data: users.to_vec(),
    }))
}
