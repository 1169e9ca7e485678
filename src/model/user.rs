use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Public view of an active user, as shown on the selection screen.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow, ToSchema)]
pub struct UserProfile {
    #[schema(example = 1)]
    pub id: u64,
    #[schema(example = "jdoe")]
    pub username: String,
    #[schema(example = "John")]
    pub first_name: String,
    #[schema(example = "Doe")]
    pub last_name: String,
}

impl UserProfile {
    /// Full name, or the username when no name is on file.
    pub fn display_name(&self) -> String {
        display_name(&self.first_name, &self.last_name, &self.username)
    }
}

/// "first last", trimmed. Empty when neither name is set.
pub fn full_name(first_name: &str, last_name: &str) -> String {
    format!("{} {}", first_name, last_name).trim().to_string()
}

pub fn display_name(first_name: &str, last_name: &str, username: &str) -> String {
    let name = full_name(first_name, last_name);
    if name.is_empty() {
        username.to_string()
    } else {
        name
    }
}
