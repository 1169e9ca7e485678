pub mod used_tokens;
pub mod user_directory;
