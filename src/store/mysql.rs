use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use sqlx::{FromRow, MySqlPool};

use crate::model::attendance::AttendanceRecord;
use crate::model::user::{UserProfile, full_name};
use crate::models::UserSql;
use crate::store::{AttendanceStore, ReportEntry, ReportFilter, UserStore};

/// sqlx adapter over the `users` and `attendance_records` tables.
#[derive(Clone)]
pub struct MySqlStore {
    pool: MySqlPool,
}

impl MySqlStore {
    pub fn new(pool: MySqlPool) -> Self {
        Self { pool }
    }
}

#[derive(FromRow)]
struct AttendanceRow {
    user_id: u64,
    date: NaiveDate,
    clock_in_time: Option<NaiveTime>,
    clock_out_time: Option<NaiveTime>,
    break_start_time: Option<NaiveTime>,
    break_end_time: Option<NaiveTime>,
}

impl AttendanceRow {
    fn into_domain(self) -> AttendanceRecord {
        AttendanceRecord::restore(
            self.user_id,
            self.date,
            self.clock_in_time,
            self.clock_out_time,
            self.break_start_time,
            self.break_end_time,
        )
    }
}

#[derive(FromRow)]
struct ReportRow {
    username: String,
    first_name: String,
    last_name: String,
    #[sqlx(flatten)]
    record: AttendanceRow,
}

// Helper enum for typed SQLx binding
enum FilterValue {
    U64(u64),
    Date(NaiveDate),
}

const RECORD_COLUMNS: &str =
    "a.user_id, a.date, a.clock_in_time, a.clock_out_time, a.break_start_time, a.break_end_time";

#[async_trait]
impl AttendanceStore for MySqlStore {
    async fn find(&self, user_id: u64, date: NaiveDate) -> Result<Option<AttendanceRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records a WHERE a.user_id = ? AND a.date = ?"
        );

        let row = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(user_id)
            .bind(date)
            .fetch_optional(&self.pool)
            .await
            .context("failed to fetch attendance record")?;

        Ok(row.map(AttendanceRow::into_domain))
    }

    async fn save(&self, record: &AttendanceRecord) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO attendance_records
                (user_id, date, clock_in_time, clock_out_time, break_start_time, break_end_time,
                 total_work_seconds, total_break_seconds)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON DUPLICATE KEY UPDATE
                clock_in_time = VALUES(clock_in_time),
                clock_out_time = VALUES(clock_out_time),
                break_start_time = VALUES(break_start_time),
                break_end_time = VALUES(break_end_time),
                total_work_seconds = VALUES(total_work_seconds),
                total_break_seconds = VALUES(total_break_seconds)
            "#,
        )
        .bind(record.user_id())
        .bind(record.date())
        .bind(record.clock_in_time())
        .bind(record.clock_out_time())
        .bind(record.break_start_time())
        .bind(record.break_end_time())
        .bind(record.total_work_time().map(|d| d.num_seconds()))
        .bind(record.total_break_time().num_seconds())
        .execute(&self.pool)
        .await
        .context("failed to save attendance record")?;

        Ok(())
    }

    async fn for_date(&self, date: NaiveDate) -> Result<Vec<AttendanceRecord>> {
        let sql = format!(
            "SELECT {RECORD_COLUMNS} FROM attendance_records a WHERE a.date = ? ORDER BY a.user_id"
        );

        let rows = sqlx::query_as::<_, AttendanceRow>(&sql)
            .bind(date)
            .fetch_all(&self.pool)
            .await
            .context("failed to fetch attendance for date")?;

        Ok(rows.into_iter().map(AttendanceRow::into_domain).collect())
    }

    async fn search(&self, filter: &ReportFilter) -> Result<Vec<ReportEntry>> {
        let mut where_sql = String::from(" WHERE 1=1");
        let mut args: Vec<FilterValue> = Vec::new();

        if let Some(start) = filter.start_date {
            where_sql.push_str(" AND a.date >= ?");
            args.push(FilterValue::Date(start));
        }

        if let Some(end) = filter.end_date {
            where_sql.push_str(" AND a.date <= ?");
            args.push(FilterValue::Date(end));
        }

        if let Some(user_id) = filter.user_id {
            where_sql.push_str(" AND a.user_id = ?");
            args.push(FilterValue::U64(user_id));
        }

        let sql = format!(
            r#"
            SELECT u.username, u.first_name, u.last_name, {RECORD_COLUMNS}
            FROM attendance_records a
            JOIN users u ON u.id = a.user_id
            {where_sql}
            ORDER BY a.date DESC, a.user_id ASC
            "#
        );
        tracing::debug!(sql = %sql, ?filter, "Searching attendance records");

        let mut query = sqlx::query_as::<_, ReportRow>(&sql);
        for arg in args {
            query = match arg {
                FilterValue::U64(v) => query.bind(v),
                FilterValue::Date(d) => query.bind(d),
            };
        }

        let rows = query
            .fetch_all(&self.pool)
            .await
            .context("failed to search attendance records")?;

        Ok(rows
            .into_iter()
            .map(|row| ReportEntry {
                full_name: full_name(&row.first_name, &row.last_name),
                username: row.username,
                record: row.record.into_domain(),
            })
            .collect())
    }
}

#[async_trait]
impl UserStore for MySqlStore {
    async fn find_active(&self, user_id: u64) -> Result<Option<UserSql>> {
        sqlx::query_as::<_, UserSql>(
            r#"
            SELECT id, username, first_name, last_name, password, is_active
            FROM users
            WHERE id = ? AND is_active = TRUE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .context("failed to fetch user")
    }

    async fn list_active(&self) -> Result<Vec<UserProfile>> {
        sqlx::query_as::<_, UserProfile>(
            r#"
            SELECT id, username, first_name, last_name
            FROM users
            WHERE is_active = TRUE
            ORDER BY last_name, first_name, id
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .context("failed to list active users")
    }
}
