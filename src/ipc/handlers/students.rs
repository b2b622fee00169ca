use crate::ingest;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{course_from_params, db_conn, required_str, save_course, HandlerResult};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;
use tracing::info;

fn students_import_csv(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let mut course = course_from_params(state, req)?;
    let path = PathBuf::from(required_str(req, "path")?);
    let rows = ingest::read_csv_rows(&path)
        .map_err(|e| err(&req.id, "io_failed", format!("{e:#}"), None))?;

    let imported = course.import_roster(&rows);
    save_course(db_conn(state, req)?, req, &course)?;
    info!(course = %course.code, imported, "roster imported");
    Ok(json!({ "imported": imported }))
}

fn students_list(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let course = course_from_params(state, req)?;
    let students: Vec<serde_json::Value> = course
        .students()
        .iter()
        .map(|s| json!({ "id": s.id, "name": s.name }))
        .collect();
    Ok(json!({ "students": students }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "students.importCsv" => students_import_csv(state, req),
        "students.list" => students_list(state, req),
        _ => return None,
    };
    Some(result.map_or_else(|e| e, |v| ok(&req.id, v)))
}
