use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use strum_macros::{AsRefStr, Display};
use utoipa::ToSchema;

use crate::model::action::{ClockAction, Rejection};

#[derive(
    Debug, Copy, Clone, Eq, PartialEq, Serialize, Deserialize, Display, AsRefStr, ToSchema,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AttendanceStatus {
    NotClockedIn,
    ClockedIn,
    OnBreak,
    ClockedOut,
}

impl AttendanceStatus {
    pub fn label(&self) -> &'static str {
        match self {
            AttendanceStatus::NotClockedIn => "Not clocked in",
            AttendanceStatus::ClockedIn => "Working",
            AttendanceStatus::OnBreak => "On break",
            AttendanceStatus::ClockedOut => "Clocked out",
        }
    }
}

/// The attendance entry of one user for one calendar date.
///
/// Punch times are only ever filled in, never overwritten. The two totals are
/// derived from the punches and recomputed after every change, so there is no
/// way to set them from the outside.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttendanceRecord {
    user_id: u64,
    date: NaiveDate,
    clock_in_time: Option<NaiveTime>,
    clock_out_time: Option<NaiveTime>,
    break_start_time: Option<NaiveTime>,
    break_end_time: Option<NaiveTime>,
    total_work_time: Option<Duration>,
    total_break_time: Duration,
}

impl AttendanceRecord {
    /// Blank record for `user_id` on `date`.
    pub fn new(user_id: u64, date: NaiveDate) -> Self {
        Self {
            user_id,
            date,
            clock_in_time: None,
            clock_out_time: None,
            break_start_time: None,
            break_end_time: None,
            total_work_time: None,
            total_break_time: Duration::zero(),
        }
    }

    /// Rebuilds a record from stored punches. Stored totals are ignored and
    /// recomputed.
    pub fn restore(
        user_id: u64,
        date: NaiveDate,
        clock_in_time: Option<NaiveTime>,
        clock_out_time: Option<NaiveTime>,
        break_start_time: Option<NaiveTime>,
        break_end_time: Option<NaiveTime>,
    ) -> Self {
        let mut record = Self {
            clock_in_time,
            clock_out_time,
            break_start_time,
            break_end_time,
            ..Self::new(user_id, date)
        };
        record.recompute();
        record
    }

    pub fn user_id(&self) -> u64 {
        self.user_id
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn clock_in_time(&self) -> Option<NaiveTime> {
        self.clock_in_time
    }

    pub fn clock_out_time(&self) -> Option<NaiveTime> {
        self.clock_out_time
    }

    pub fn break_start_time(&self) -> Option<NaiveTime> {
        self.break_start_time
    }

    pub fn break_end_time(&self) -> Option<NaiveTime> {
        self.break_end_time
    }

    pub fn total_work_time(&self) -> Option<Duration> {
        self.total_work_time
    }

    pub fn total_break_time(&self) -> Duration {
        self.total_break_time
    }

    /// Checks whether `action` may be applied right now.
    pub fn check(&self, action: ClockAction) -> Result<(), Rejection> {
        match action {
            ClockAction::ClockIn => {
                if self.clock_in_time.is_some() {
                    return Err(Rejection::AlreadyClockedIn);
                }
            }
            ClockAction::ClockOut => {
                if self.clock_in_time.is_none() {
                    return Err(Rejection::NotClockedIn);
                }
                if self.clock_out_time.is_some() {
                    return Err(Rejection::AlreadyClockedOut);
                }
            }
            ClockAction::BreakStart => {
                if self.clock_in_time.is_none() {
                    return Err(Rejection::NotClockedIn);
                }
                if self.clock_out_time.is_some() {
                    return Err(Rejection::AlreadyClockedOut);
                }
                if self.break_start_time.is_some() {
                    return Err(if self.break_end_time.is_some() {
                        Rejection::BreakAlreadyTaken
                    } else {
                        Rejection::AlreadyOnBreak
                    });
                }
            }
            ClockAction::BreakEnd => {
                if self.break_start_time.is_none() {
                    return Err(Rejection::NotOnBreak);
                }
                if self.break_end_time.is_some() {
                    return Err(Rejection::BreakAlreadyEnded);
                }
            }
        }
        Ok(())
    }

    /// Records `action` at `now` and refreshes the totals. On rejection the
    /// record is unchanged.
    pub fn apply(&mut self, action: ClockAction, now: NaiveTime) -> Result<(), Rejection> {
        self.check(action)?;

        let slot = match action {
            ClockAction::ClockIn => &mut self.clock_in_time,
            ClockAction::ClockOut => &mut self.clock_out_time,
            ClockAction::BreakStart => &mut self.break_start_time,
            ClockAction::BreakEnd => &mut self.break_end_time,
        };
        *slot = Some(now);

        self.recompute();
        Ok(())
    }

    pub fn is_clocked_in(&self) -> bool {
        self.clock_in_time.is_some() && self.clock_out_time.is_none()
    }

    pub fn is_on_break(&self) -> bool {
        self.break_start_time.is_some() && self.break_end_time.is_none()
    }

    pub fn status(&self) -> AttendanceStatus {
        if self.clock_in_time.is_none() {
            AttendanceStatus::NotClockedIn
        } else if self.is_on_break() {
            AttendanceStatus::OnBreak
        } else if self.is_clocked_in() {
            AttendanceStatus::ClockedIn
        } else {
            AttendanceStatus::ClockedOut
        }
    }

    /// `(work, break)` for the current punches. Work is `None` until both
    /// clock boundaries exist; both values are floored at zero.
    pub fn compute_durations(&self) -> (Option<Duration>, Duration) {
        let break_time = match (self.break_start_time, self.break_end_time) {
            (Some(start), Some(end)) => floor_zero(self.at(end) - self.at(start)),
            _ => Duration::zero(),
        };

        let work_time = match (self.clock_in_time, self.clock_out_time) {
            (Some(start), Some(end)) => {
                Some(floor_zero(self.at(end) - self.at(start) - break_time))
            }
            _ => None,
        };

        (work_time, break_time)
    }

    fn recompute(&mut self) {
        let (work_time, break_time) = self.compute_durations();
        self.total_break_time = break_time;
        self.total_work_time = work_time;
    }

    // All punches belong to the record's own date; overnight shifts are not modelled.
    fn at(&self, time: NaiveTime) -> NaiveDateTime {
        self.date.and_time(time)
    }
}

fn floor_zero(duration: Duration) -> Duration {
    duration.max(Duration::zero())
}

/// JSON shape of a record as returned by the API.
#[derive(Debug, Serialize, ToSchema)]
pub struct AttendanceView {
    #[schema(example = 1)]
    pub user_id: u64,
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    #[schema(example = "09:00:00", value_type = Option<String>)]
    pub clock_in_time: Option<NaiveTime>,
    #[schema(example = "18:00:00", value_type = Option<String>)]
    pub clock_out_time: Option<NaiveTime>,
    #[schema(example = "12:00:00", value_type = Option<String>)]
    pub break_start_time: Option<NaiveTime>,
    #[schema(example = "13:00:00", value_type = Option<String>)]
    pub break_end_time: Option<NaiveTime>,
    /// Worked seconds, null until clocked out
    #[schema(example = 28800)]
    pub total_work_seconds: Option<i64>,
    #[schema(example = 3600)]
    pub total_break_seconds: i64,
    pub status: AttendanceStatus,
}

impl From<&AttendanceRecord> for AttendanceView {
    fn from(record: &AttendanceRecord) -> Self {
        Self {
            user_id: record.user_id,
            date: record.date,
            clock_in_time: record.clock_in_time,
            clock_out_time: record.clock_out_time,
            break_start_time: record.break_start_time,
            break_end_time: record.break_end_time,
            total_work_seconds: record.total_work_time.map(|d| d.num_seconds()),
            total_break_seconds: record.total_break_time.num_seconds(),
            status: record.status(),
        }
    }
}
