use crate::ingest;
use crate::ipc::error::{domain_err, err, ok};
use crate::ipc::helpers::{
    course_from_params, db_conn, required_f64, required_str, save_course, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;
use std::path::PathBuf;

fn grades_enter(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let mut course = course_from_params(state, req)?;
    let student_id = required_str(req, "studentId")?;
    let assignment_name = required_str(req, "assignmentName")?;
    let score = required_f64(req, "score")?;

    course
        .enter_grade(&student_id, &assignment_name, score)
        .map_err(|e| domain_err(&req.id, &e))?;
    save_course(db_conn(state, req)?, req, &course)?;
    Ok(json!({ "ok": true }))
}

fn grades_bulk_import_csv(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let mut course = course_from_params(state, req)?;
    let path = PathBuf::from(required_str(req, "path")?);
    let rows = ingest::read_csv_rows(&path)
        .map_err(|e| err(&req.id, "io_failed", format!("{e:#}"), None))?;

    let summary = ingest::ingest_grade_rows(&mut course, &rows);
    save_course(db_conn(state, req)?, req, &course)?;
    Ok(json!(summary))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "grades.enter" => grades_enter(state, req),
        "grades.bulkImportCsv" => grades_bulk_import_csv(state, req),
        _ => return None,
    };
    Some(result.map_or_else(|e| e, |v| ok(&req.id, v)))
}
