use crate::calc;
use crate::ipc::error::{err, ok};
use crate::ipc::helpers::{course_from_params, optional_f64, required_str, HandlerResult};
use crate::ipc::types::{AppState, Request};
use crate::outliers::{self, DEFAULT_THRESHOLD_STDDEV};
use serde_json::json;

fn calc_weighted_scores(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let course = course_from_params(state, req)?;
    let totals: Vec<serde_json::Value> = calc::calculate_weighted_scores(&course)
        .into_iter()
        .zip(course.students())
        .map(|(t, s)| {
            json!({
                "studentId": t.student_id,
                "name": s.name,
                "weightedTotal": t.weighted_total,
                "letter": t.letter(),
            })
        })
        .collect();
    Ok(json!({ "totals": totals }))
}

fn calc_outliers(state: &AppState, req: &Request) -> HandlerResult<serde_json::Value> {
    let course = course_from_params(state, req)?;
    let assignment_name = required_str(req, "assignmentName")?;
    let threshold = optional_f64(req, "thresholdStdDev")?.unwrap_or(DEFAULT_THRESHOLD_STDDEV);
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(err(
            &req.id,
            "bad_params",
            "thresholdStdDev must be a non-negative number",
            Some(json!({ "thresholdStdDev": threshold })),
        ));
    }

    let flagged: Vec<serde_json::Value> =
        outliers::detect_outliers(&course, &assignment_name, threshold)
            .into_iter()
            .map(|o| {
                let name = course
                    .student(&o.student_id)
                    .map(|s| s.name.clone())
                    .unwrap_or_default();
                json!({ "studentId": o.student_id, "name": name, "score": o.score })
            })
            .collect();
    Ok(json!({ "outliers": flagged }))
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    let result = match req.method.as_str() {
        "calc.weightedScores" => calc_weighted_scores(state, req),
        "calc.outliers" => calc_outliers(state, req),
        _ => return None,
    };
    Some(result.map_or_else(|e| e, |v| ok(&req.id, v)))
}
