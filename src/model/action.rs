use derive_more::Display;
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, EnumString};
use utoipa::ToSchema;

/// One of the four punches a user can make on the clock.
#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, EnumString, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ClockAction {
    ClockIn,
    ClockOut,
    BreakStart,
    BreakEnd,
}

impl ClockAction {
    /// Past-tense phrase used in the confirmation message ("Jane Doe clocked in").
    pub fn past_tense(&self) -> &'static str {
        match self {
            ClockAction::ClockIn => "clocked in",
            ClockAction::ClockOut => "clocked out",
            ClockAction::BreakStart => "started a break",
            ClockAction::BreakEnd => "returned from break",
        }
    }
}

/// Why an action was refused. The record is left untouched whenever one of
/// these is returned.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Display, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    #[display(fmt = "Already clocked in")]
    AlreadyClockedIn,
    #[display(fmt = "No clock-in has been recorded today")]
    NotClockedIn,
    #[display(fmt = "Already clocked out")]
    AlreadyClockedOut,
    #[display(fmt = "Already on break")]
    AlreadyOnBreak,
    #[display(fmt = "Today's break has already been taken")]
    BreakAlreadyTaken,
    #[display(fmt = "Not on break")]
    NotOnBreak,
    #[display(fmt = "Already returned from break")]
    BreakAlreadyEnded,
}
