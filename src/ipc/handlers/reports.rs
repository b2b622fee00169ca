use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{course_from_params, optional_bool, required_str, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::report;
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn reports_class_report(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let course = course_from_params(state, req)?;
    let include_letter = optional_bool(req, "includeLetter")?.unwrap_or(true);
    let rows = report::generate_class_report(&course, include_letter);
    Ok(json!({
        "courseCode": course.code,
        "title": course.title,
        "rows": rows,
    }))
}

fn reports_export_csv(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let course = course_from_params(state, req)?;
    let out_path = PathBuf::from(required_str(req, "outPath")?);
    let row_count = report::export_report_csv(&course, &out_path)
        .map_err(|e| err(&req.id, "io_failed", format!("{e:#}"), None))?;
    info!(course = %course.code, path = %out_path.to_string_lossy(), row_count, "report exported");
    Ok(json!({ "path": out_path.to_string_lossy(), "rowCount": row_count }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "reports.classReport" => reports_class_report(state, req),
        "reports.exportCsv" => reports_export_csv(state, req),
        _ => return None,
    };
    Some(result.map_or_else(|e| e, |v| ok(&req.id, v)))
}
