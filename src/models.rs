use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

use crate::model::user::UserProfile;

#[derive(Deserialize, ToSchema)]
pub struct LoginReqDto {
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = "secret")]
    pub password: String,
}

#[derive(Debug, Clone, FromRow)]
pub struct UserSql {
    pub id: u64, // 👈 matches BIGINT UNSIGNED
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub password: String,
    pub is_active: bool,
}

impl UserSql {
    pub fn profile(&self) -> UserProfile {
        UserProfile {
            id: self.id,
            username: self.username.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
        }
    }
}

/// Claims of the clock token handed out after a successful password check.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub user_id: u64,
    pub sub: String,
    pub exp: usize,
    pub jti: String,
}
