use crate::export::{csv, pdf, pdf::ReportFonts};
use crate::model::attendance::AttendanceView;
use crate::store::{AttendanceStore, ReportEntry, ReportFilter};
use actix_web::{HttpResponse, Responder, http::header, web};
use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::{IntoParams, ToSchema};

/// Raw report query. Values that do not parse are ignored rather than rejected.
#[derive(Debug, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// First date to include, `YYYY-MM-DD`
    #[schema(example = "2026-01-01")]
    pub start_date: Option<String>,
    /// Last date to include, `YYYY-MM-DD`
    #[schema(example = "2026-01-31")]
    pub end_date: Option<String>,
    /// Only records of this user id
    #[schema(example = "1")]
    pub user: Option<String>,
}

impl ReportQuery {
    pub fn to_filter(&self) -> ReportFilter {
        ReportFilter {
            start_date: parse_date(self.start_date.as_deref()),
            end_date: parse_date(self.end_date.as_deref()),
            user_id: self
                .user
                .as_deref()
                .and_then(|raw| raw.trim().parse().ok()),
        }
    }
}

fn parse_date(raw: Option<&str>) -> Option<NaiveDate> {
    raw.and_then(|s| NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").ok())
}

#[derive(Serialize, ToSchema)]
pub struct ReportRow {
    #[schema(example = "John Doe")]
    pub user: String,
    #[schema(example = "jdoe")]
    pub username: String,
    pub record: AttendanceView,
}

#[derive(Serialize, ToSchema)]
pub struct ReportResponse {
    pub data: Vec<ReportRow>,
    #[schema(example = 1)]
    pub total: usize,
}

async fn load(
    store: &dyn AttendanceStore,
    query: &ReportQuery,
) -> actix_web::Result<Vec<ReportEntry>> {
    let filter = query.to_filter();
    debug!(?query, ?filter, "Loading report");

    store.search(&filter).await.map_err(|e| {
        error!(error = %e, ?filter, "Failed to load report");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })
}

/// Attendance records filtered by date range and user
#[utoipa::path(
    get,
    path = "/api/reports",
    params(ReportQuery),
    responses(
        (status = 200, description = "Matching records, newest first", body = ReportResponse),
        (status = 500, description = "Internal server error")
    ),
    tag = "Reports"
)]
pub async fn list_reports(
    store: web::Data<dyn AttendanceStore>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    let entries = load(store.get_ref(), &query).await?;

    let data: Vec<ReportRow> = entries
        .iter()
        .map(|e| ReportRow {
            user: e.full_name.clone(),
            username: e.username.clone(),
            record: AttendanceView::from(&e.record),
        })
        .collect();

    Ok(HttpResponse::Ok().json(ReportResponse {
        total: data.len(),
        data,
    }))
}

/// CSV export of the filtered records
#[utoipa::path(
    get,
    path = "/api/reports/export/csv",
    params(ReportQuery),
    responses(
        (status = 200, description = "CSV file with a UTF-8 BOM", body = String, content_type = "text/csv"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Reports"
)]
pub async fn export_csv(
    store: web::Data<dyn AttendanceStore>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    let entries = load(store.get_ref(), &query).await?;

    Ok(HttpResponse::Ok()
        .content_type("text/csv; charset=utf-8")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"attendance_report.csv\"",
        ))
        .body(csv::render_report(&entries)))
}

/// PDF export of the first 100 filtered records
#[utoipa::path(
    get,
    path = "/api/reports/export/pdf",
    params(ReportQuery),
    responses(
        (status = 200, description = "PDF document", body = Vec<u8>, content_type = "application/pdf"),
        (status = 500, description = "Internal server error")
    ),
    tag = "Reports"
)]
pub async fn export_pdf(
    store: web::Data<dyn AttendanceStore>,
    fonts: web::Data<ReportFonts>,
    query: web::Query<ReportQuery>,
) -> actix_web::Result<impl Responder> {
    let entries = load(store.get_ref(), &query).await?;
    let generated_at = Local::now().naive_local();

    let bytes = pdf::render_report(&fonts, &entries, generated_at).map_err(|e| {
        error!(error = %e, rows = entries.len(), "Failed to render PDF report");
        actix_web::error::ErrorInternalServerError("Internal Server Error")
    })?;

    Ok(HttpResponse::Ok()
        .content_type("application/pdf")
        .insert_header((
            header::CONTENT_DISPOSITION,
            "attachment; filename=\"attendance_report.pdf\"",
        ))
        .body(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(start: Option<&str>, end: Option<&str>, user: Option<&str>) -> ReportQuery {
        ReportQuery {
            start_date: start.map(str::to_string),
            end_date: end.map(str::to_string),
            user: user.map(str::to_string),
        }
    }

    #[test]
    fn valid_filters_are_applied() {
        let filter = query(Some("2026-01-01"), Some("2026-01-31"), Some("4")).to_filter();
        assert_eq!(filter.start_date, NaiveDate::from_ymd_opt(2026, 1, 1));
        assert_eq!(filter.end_date, NaiveDate::from_ymd_opt(2026, 1, 31));
        assert_eq!(filter.user_id, Some(4));
    }

    #[test]
    fn invalid_filters_are_dropped() {
        let filter = query(Some("01/02/2026"), Some(""), Some("bob")).to_filter();
        assert_eq!(filter, ReportFilter::default());
    }
}
