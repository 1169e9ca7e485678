use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::NaiveDate;

use crate::model::attendance::AttendanceRecord;
use crate::model::user::{UserProfile, full_name};
use crate::models::UserSql;
use crate::store::{AttendanceStore, ReportEntry, ReportFilter, UserStore};

/// Map-backed store keyed by user id and by `(user_id, date)`.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<BTreeMap<u64, UserSql>>,
    records: RwLock<HashMap<(u64, NaiveDate), AttendanceRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_user(&self, user: UserSql) -> Result<()> {
        self.users
            .write()
            .map_err(|_| anyhow!("user map poisoned"))?
            .insert(user.id, user);
        Ok(())
    }
}

#[async_trait]
impl AttendanceStore for MemoryStore {
    async fn find(&self, user_id: u64, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("attendance map poisoned"))?;
        Ok(records.get(&(user_id, date)).cloned())
    }

    async fn save(&self, record: &AttendanceRecord) -> Result<()> {
        self.records
            .write()
            .map_err(|_| anyhow!("attendance map poisoned"))?
            .insert((record.user_id(), record.date()), record.clone());
        Ok(())
    }

    async fn for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>> {
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("attendance map poisoned"))?;

        let mut found: Vec<_> = records
            .values()
            .filter(|r| r.date() == date)
            .cloned()
            .collect();
        found.sort_by_key(|r| r.user_id());
        Ok(found)
    }

    async fn search(&self, filter: &ReportFilter) -> Result<Vec<ReportEntry>> {
        let users = self.users.read().map_err(|_| anyhow!("user map poisoned"))?;
        let records = self
            .records
            .read()
            .map_err(|_| anyhow!("attendance map poisoned"))?;

        let mut entries: Vec<ReportEntry> = records
            .values()
            .filter(|r| filter.matches(r.user_id(), r.date()))
            .filter_map(|r| {
                users.get(&r.user_id()).map(|u| ReportEntry {
                    username: u.username.clone(),
                    full_name: full_name(&u.first_name, &u.last_name),
                    record: r.clone(),
                })
            })
            .collect();

        entries.sort_by(|a, b| {
            b.record
                .date()
                .cmp(&a.record.date())
                .then(a.record.user_id().cmp(&b.record.user_id()))
        });
        Ok(entries)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn find_active(&self, user_id: u64) -> Result<Option<UserSql>> {
        let users = self.users.read().map_err(|_| anyhow!("user map poisoned"))?;
        Ok(users.get(&user_id).filter(|u| u.is_active).cloned())
    }

    async fn list_active(&self) -> Result<Vec<UserProfile>> {
        let users = self.users.read().map_err(|_| anyhow!("user map poisoned"))?;

        let mut active: Vec<UserProfile> = users
            .values()
            .filter(|u| u.is_active)
            .map(UserSql::profile)
            .collect();
        active.sort_by(|a, b| {
            a.last_name
                .cmp(&b.last_name)
                .then_with(|| a.first_name.cmp(&b.first_name))
                .then(a.id.cmp(&b.id))
        });
        Ok(active)
    }
}
