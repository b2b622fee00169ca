use crate::course::Course;
use crate::db;
use crate::error::GradebookError;
use crate::ipc::error::{domain_err, err};
use crate::ipc::types::{AppState, Request};
use rusqlite::Connection;

pub type HandlerResult<T> = Result<T, serde_json::Value>;

pub fn db_conn<'a>(state: &'a AppState, req: &Request) -> HandlerResult<&'a Connection> {
    state
        .db
        .as_ref()
        .ok_or_else(|| err(&req.id, "no_workspace", "select a workspace first", None))
}

/// Trimmed, non-empty string param.
pub fn required_str(req: &Request, key: &str) -> HandlerResult<String> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

pub fn optional_str(req: &Request, key: &str) -> HandlerResult<Option<String>> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_str()
            .map(|s| Some(s.trim().to_string()))
            .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be a string", key), None)),
    }
}

pub fn required_f64(req: &Request, key: &str) -> HandlerResult<f64> {
    optional_f64(req, key)?
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Absent or null is None; anything present must be a JSON number.
pub fn optional_f64(req: &Request, key: &str) -> HandlerResult<Option<f64>> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v.as_f64().map(Some).ok_or_else(|| {
            err(
                &req.id,
                "bad_params",
                format!("{} must be a number", key),
                Some(serde_json::json!({ "param": key, "value": v })),
            )
        }),
    }
}

pub fn optional_bool(req: &Request, key: &str) -> HandlerResult<Option<bool>> {
    match req.params.get(key) {
        None => Ok(None),
        Some(v) if v.is_null() => Ok(None),
        Some(v) => v
            .as_bool()
            .map(Some)
            .ok_or_else(|| err(&req.id, "bad_params", format!("{} must be a boolean", key), None)),
    }
}

pub fn load_course(conn: &Connection, req: &Request, code: &str) -> HandlerResult<Course> {
    match db::load_course(conn, code) {
        Ok(Some(c)) => Ok(c),
        Ok(None) => Err(domain_err(
            &req.id,
            &GradebookError::CourseNotFound(code.to_string()),
        )),
        Err(e) => Err(err(&req.id, "db_query_failed", format!("{e:#}"), None)),
    }
}

/// Loads the course named by `params.courseCode`.
pub fn course_from_params(state: &AppState, req: &Request) -> HandlerResult<Course> {
    let conn = db_conn(state, req)?;
    let code = required_str(req, "courseCode")?;
    load_course(conn, req, &code)
}

pub fn save_course(conn: &Connection, req: &Request, course: &Course) -> HandlerResult<()> {
    db::save_course(conn, course)
        .map_err(|e| err(&req.id, "db_write_failed", format!("{e:#}"), None))
}
