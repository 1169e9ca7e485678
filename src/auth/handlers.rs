use crate::{
    auth::{auth::AuthUser, jwt::generate_clock_token, password::verify_password},
    config::Config,
    model::user::UserProfile,
    models::LoginReqDto,
    store::UserStore,
    utils::{used_tokens::UsedTokens, user_directory::UserDirectory},
};
use actix_web::{HttpResponse, Responder, web};
use serde::Serialize;
use serde_json::json;
use tracing::{debug, error, info, instrument};
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct LoginResponse {
    pub access_token: String,
    #[schema(example = "Bearer")]
    pub token_type: String,
    /// Seconds until the token expires
    #[schema(example = 300)]
    pub expires_in: usize,
    pub user: UserProfile,
}

/// Verify the selected user's password and hand out a clock token
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginReqDto,
    responses(
        (status = 200, description = "Password accepted", body = LoginResponse),
        (status = 400, description = "Password missing"),
        (status = 401, description = "Invalid credentials"),
        (status = 429, description = "Too many attempts"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Auth"
)]
#[instrument(
    name = "auth_login",
    skip(users, directory, config, body),
    fields(user_id = body.user_id)
)]
pub async fn login(
    body: web::Json<LoginReqDto>,
    users: web::Data<dyn UserStore>,
    directory: web::Data<UserDirectory>,
    config: web::Data<Config>,
) -> impl Responder {
    info!("Login request received");

    // 1️⃣ Basic validation
    if body.password.is_empty() {
        info!("Validation failed: empty password");
        return HttpResponse::BadRequest().json(json!({
            "error": "Password required"
        }));
    }

    // 2️⃣ Fetch user (inactive users are treated as unknown)
    let db_user = match users.find_active(body.user_id).await {
        Ok(Some(user)) => {
            debug!(username = %user.username, "User found");
            user
        }
        Ok(None) => {
            info!("Invalid credentials: user not found or inactive");
            // the selection list may still show this user
            directory.invalidate().await;
            return HttpResponse::Unauthorized().json(json!({
                "error": "Invalid credentials"
            }));
        }
        Err(e) => {
            error!(error = %e, "Database error while fetching user");
            return HttpResponse::InternalServerError().finish();
        }
    };

    // 3️⃣ Verify password
    if let Err(e) = verify_password(&body.password, &db_user.password) {
        info!(error = %e, "Invalid credentials: password mismatch");
        return HttpResponse::Unauthorized().json(json!({
            "error": "Invalid credentials"
        }));
    }

    debug!("Password verified");

    // 4️⃣ Issue clock token
    let access_token = match generate_clock_token(
        db_user.id,
        db_user.username.clone(),
        &config.jwt_secret,
        config.clock_token_ttl,
    ) {
        Ok(token) => token,
        Err(e) => {
            error!(error = %e, "Failed to sign clock token");
            return HttpResponse::InternalServerError().finish();
        }
    };

    info!("Login successful");

    HttpResponse::Ok().json(LoginResponse {
        access_token,
        token_type: "Bearer".to_string(),
        expires_in: config.clock_token_ttl,
        user: db_user.profile(),
    })
}

/// Drop the current selection so the token cannot be used for a punch
#[utoipa::path(
    post,
    path = "/auth/clear",
    responses(
        (status = 200, description = "Selection cleared", body = Object, example = json!({
            "message": "Selection cleared"
        })),
        (status = 401, description = "Missing or invalid token")
    ),
    security(
        ("bearer_auth" = [])
    ),
    tag = "Auth"
)]
pub async fn clear(auth: AuthUser, used_tokens: web::Data<UsedTokens>) -> impl Responder {
    used_tokens.revoke(&auth.token_id).await;
    info!(user_id = auth.user_id, "Selection cleared");

    HttpResponse::Ok().json(json!({
        "message": "Selection cleared"
    }))
}
