use crate::export::{format_duration_padded, format_time};
use crate::store::ReportEntry;

const HEADER: [&str; 9] = [
    "user",
    "username",
    "date",
    "clock_in",
    "clock_out",
    "break_start",
    "break_end",
    "work_time",
    "break_time",
];

/// Escape CSV field (handle commas, quotes, newlines)
fn escape_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') || field.contains('\r') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn push_row<S: AsRef<str>>(out: &mut String, fields: &[S]) {
    let line = fields
        .iter()
        .map(|f| escape_field(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",");
    out.push_str(&line);
    out.push_str("\r\n");
}

/// Renders the report as CSV, prefixed with a UTF-8 BOM so spreadsheet
/// applications pick the right encoding.
pub fn render_report(entries: &[ReportEntry]) -> String {
    let mut out = String::from('\u{feff}');
    push_row(&mut out, &HEADER[..]);

    for entry in entries {
        let record = &entry.record;
        let row = [
            entry.full_name.clone(),
            entry.username.clone(),
            record.date().format("%Y-%m-%d").to_string(),
            format_time(record.clock_in_time()),
            format_time(record.clock_out_time()),
            format_time(record.break_start_time()),
            format_time(record.break_end_time()),
            format_duration_padded(record.total_work_time()),
            format_duration_padded(Some(record.total_break_time())),
        ];
        push_row(&mut out, &row[..]);
    }

    out
}
