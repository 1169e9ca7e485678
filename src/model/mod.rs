pub mod action;
pub mod attendance;
pub mod user;
