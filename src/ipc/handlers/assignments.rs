use crate::course::DEFAULT_MAX_SCORE;
use crate::ipc::error::{domain_err, err, ok};
use crate::ipc::helpers::{
    course_from_params, db_conn, optional_f64, required_f64, required_str, save_course,
    HandlerResult,
};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn assignments_add(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let mut course = course_from_params(state, req)?;
    let name = required_str(req, "name")?;
    let weight = required_f64(req, "weight")?;
    let max_score = optional_f64(req, "maxScore")?.unwrap_or(DEFAULT_MAX_SCORE);

    course
        .add_assignment(&name, weight, max_score)
        .map_err(|e| domain_err(&req.id, &e))?;
    save_course(db_conn(state, req)?, req, &course)?;
    Ok(json!(course.catalog().get(&name)))
}

fn assignments_update(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let mut course = course_from_params(state, req)?;
    let name = required_str(req, "name")?;
    let weight = optional_f64(req, "weight")?;
    let max_score = optional_f64(req, "maxScore")?;
    if weight.is_none() && max_score.is_none() {
        return Err(err(
            &req.id,
            "bad_params",
            "nothing to update: pass weight and/or maxScore",
            None,
        ));
    }

    let updated = course
        .catalog_mut()
        .update(&name, weight, max_score)
        .map_err(|e| domain_err(&req.id, &e))?
        .clone();
    save_course(db_conn(state, req)?, req, &course)?;
    Ok(json!(updated))
}

fn assignments_list(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let course = course_from_params(state, req)?;
    let assignments: Vec<_> = course.catalog().iter().collect();
    Ok(json!({ "assignments": assignments }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "assignments.add" => assignments_add(state, req),
        "assignments.update" => assignments_update(state, req),
        "assignments.list" => assignments_list(state, req),
        _ => return None,
    };
    Some(result.map_or_else(|e| e, |v| ok(&req.id, v)))
}
