use std::collections::HashMap;

use anyhow::Result;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::Serialize;
use tracing::{debug, info};
use utoipa::ToSchema;

use crate::model::action::{ClockAction, Rejection};
use crate::model::attendance::{AttendanceRecord, AttendanceStatus, AttendanceView};
use crate::model::user::UserProfile;
use crate::store::AttendanceStore;

/// What happened when a user punched the clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockOutcome {
    Recorded {
        time: NaiveTime,
        record: AttendanceRecord,
    },
    /// Nothing was written; `record` is the state the action was checked against.
    Rejected {
        reason: Rejection,
        record: AttendanceRecord,
    },
}

/// Applies `action` to the user's record for the date of `now`.
///
/// A missing record is only persisted once an action on it succeeds, so the
/// first row of the day is always written by a clock-in.
pub async fn apply_action(
    store: &dyn AttendanceStore,
    user_id: u64,
    action: ClockAction,
    now: NaiveDateTime,
) -> Result<ClockOutcome> {
    let date = now.date();
    let time = now.time().with_nanosecond(0).unwrap_or(now.time());

    let mut record = match store.find(user_id, date).await? {
        Some(record) => record,
        None => {
            debug!(user_id, %date, "No record for today yet");
            AttendanceRecord::new(user_id, date)
        }
    };

    match record.apply(action, time) {
        Ok(()) => {
            store.save(&record).await?;
            info!(user_id, action = action.as_ref(), %time, "Clock action recorded");
            Ok(ClockOutcome::Recorded { time, record })
        }
        Err(reason) => {
            info!(user_id, action = action.as_ref(), %reason, "Clock action rejected");
            Ok(ClockOutcome::Rejected { reason, record })
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct DashboardRow {
    pub user: UserProfile,
    #[schema(example = "John Doe")]
    pub display_name: String,
    pub record: Option<AttendanceView>,
    pub status: AttendanceStatus,
    #[schema(example = "Working")]
    pub status_label: String,
    #[schema(example = 3)]
    pub total_work_hours: i64,
    #[schema(example = 25)]
    pub total_work_minutes: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct Dashboard {
    #[schema(example = "2026-01-05", format = "date", value_type = String)]
    pub date: NaiveDate,
    pub rows: Vec<DashboardRow>,
    /// Clocked in and not yet out, including users currently on break
    pub total_clocked_in: usize,
    pub total_on_break: usize,
    pub total_clocked_out: usize,
    pub total_not_clocked_in: usize,
}

/// Joins every active user with their record for `date`.
pub fn build_dashboard(
    date: NaiveDate,
    users: &[UserProfile],
    records: Vec<AttendanceRecord>,
) -> Dashboard {
    let mut by_user: HashMap<u64, AttendanceRecord> =
        records.into_iter().map(|r| (r.user_id(), r)).collect();

    let mut dashboard = Dashboard {
        date,
        rows: Vec::with_capacity(users.len()),
        total_clocked_in: 0,
        total_on_break: 0,
        total_clocked_out: 0,
        total_not_clocked_in: 0,
    };

    for user in users {
        let record = by_user.remove(&user.id);
        let status = record
            .as_ref()
            .map(AttendanceRecord::status)
            .unwrap_or(AttendanceStatus::NotClockedIn);

        let worked = record
            .as_ref()
            .and_then(AttendanceRecord::total_work_time)
            .map(|d| d.num_seconds())
            .unwrap_or(0);

        match &record {
            Some(r) if r.clock_in_time().is_some() => {
                if r.is_clocked_in() {
                    dashboard.total_clocked_in += 1;
                } else {
                    dashboard.total_clocked_out += 1;
                }
                if r.is_on_break() {
                    dashboard.total_on_break += 1;
                }
            }
            _ => dashboard.total_not_clocked_in += 1,
        }

        dashboard.rows.push(DashboardRow {
            user: user.clone(),
            display_name: user.display_name(),
            record: record.as_ref().map(AttendanceView::from),
            status,
            status_label: status.label().to_string(),
            total_work_hours: worked / 3600,
            total_work_minutes: (worked % 3600) / 60,
        });
    }

    dashboard
}
