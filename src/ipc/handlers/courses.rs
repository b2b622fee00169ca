use crate::course::Course;
use crate::db;
use crate::error::GradebookError;
use crate::ipc::error::{domain_err, err, ok};
use crate::ipc::helpers::{
    course_from_params, db_conn, optional_str, required_str, save_course, HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

const DEFAULT_TITLE: &str = "Untitled Course";
const DEMO_COURSE_CODE: &str = "demo101";

fn courses_list(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let conn = db_conn(state, req)?;
    let courses = db::list_courses(conn)
        .map_err(|e| err(&req.id, "db_query_failed", format!("{e:#}"), None))?;
    Ok(json!({ "courses": courses }))
}

fn courses_create(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let conn = db_conn(state, req)?;
    let code = required_str(req, "courseCode")?;
    let title = optional_str(req, "title")?
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_TITLE.to_string());

    let exists = db::course_exists(conn, &code)
        .map_err(|e| err(&req.id, "db_query_failed", format!("{e:#}"), None))?;
    if exists {
        return Err(domain_err(&req.id, &GradebookError::CourseExists(code)));
    }

    let course = Course::new(code, title);
    save_course(conn, req, &course)?;
    Ok(json!({ "courseCode": course.code, "title": course.title }))
}

fn courses_open(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let course = course_from_params(state, req)?;
    Ok(json!({
        "courseCode": course.code,
        "title": course.title,
        "studentCount": course.students().len(),
        "assignmentCount": course.catalog().len(),
    }))
}

fn courses_demo(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let conn = db_conn(state, req)?;
    let code = optional_str(req, "courseCode")?
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| DEMO_COURSE_CODE.to_string());
    let course = Course::demo(&code);
    save_course(conn, req, &course)?;
    Ok(json!({ "courseCode": course.code, "title": course.title }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "courses.list" => courses_list(state, req),
        "courses.create" => courses_create(state, req),
        "courses.open" => courses_open(state, req),
        "courses.demo" => courses_demo(state, req),
        _ => return None,
    };
    Some(result.map_or_else(|e| e, |v| ok(&req.id, v)))
}
