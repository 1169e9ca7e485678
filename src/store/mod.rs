//! Storage ports for attendance records and users.
//!
//! Handlers only see these traits, so the MySQL adapter can be swapped for the
//! in-memory one in tests.

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::attendance::AttendanceRecord;
use crate::model::user::UserProfile;
use crate::models::UserSql;

pub mod memory;
pub mod mysql;

pub use memory::MemoryStore;
pub use mysql::MySqlStore;

/// Narrows a report query. `None` means the filter is not applied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub user_id: Option<u64>,
}

impl ReportFilter {
    pub fn matches(&self, user_id: u64, date: NaiveDate) -> bool {
        self.start_date.is_none_or(|start| date >= start)
            && self.end_date.is_none_or(|end| date <= end)
            && self.user_id.is_none_or(|id| id == user_id)
    }
}

/// A record joined with the names of the user it belongs to.
#[derive(Debug, Clone)]
pub struct ReportEntry {
    pub username: String,
    pub full_name: String,
    pub record: AttendanceRecord,
}

#[async_trait]
pub trait AttendanceStore: Send + Sync {
    async fn find(&self, user_id: u64, date: NaiveDate) -> Result<Option<AttendanceRecord>>;

    /// Inserts or replaces the record keyed by `(user_id, date)`.
    async fn save(&self, record: &AttendanceRecord) -> Result<()>;

    async fn for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>>;

    /// Records matching `filter`, newest date first, then by user id.
    async fn search(&self, filter: &ReportFilter) -> Result<Vec<ReportEntry>>;
}

#[async_trait]
pub trait UserStore: Send + Sync {
    /// The user with its password hash, if it exists and is active.
    async fn find_active(&self, user_id: u64) -> Result<Option<UserSql>>;

    /// Active users ordered by last name, then first name.
    async fn list_active(&self) -> Result<Vec<UserProfile>>;
}
