use crate::calc::{self, LetterGrade};
use crate::course::{Course, ScoreEntry};
use anyhow::Context;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassReportRow {
    pub id: String,
    pub name: String,
    pub scores: Vec<ScoreEntry>,
    pub weighted_total: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub letter: Option<LetterGrade>,
}

pub fn generate_class_report(course: &Course, include_letter: bool) -> Vec<ClassReportRow> {
    let totals = calc::calculate_weighted_scores(course);
    course
        .students()
        .iter()
        .zip(totals)
        .map(|(s, t)| ClassReportRow {
            id: s.id.clone(),
            name: s.name.clone(),
            scores: s.scores().to_vec(),
            weighted_total: t.weighted_total,
            letter: include_letter.then(|| t.letter()),
        })
        .collect()
}

/// Writes `id,name,<assignments...>,weighted_total,letter`; returns the data row count.
pub fn export_report_csv(course: &Course, out_path: &Path) -> anyhow::Result<usize> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create directory {}", parent.to_string_lossy())
            })?;
        }
    }

    let mut wtr = csv::Writer::from_path(out_path).with_context(|| {
        format!("failed to create output file {}", out_path.to_string_lossy())
    })?;

    let names: Vec<&str> = course.catalog().iter().map(|a| a.name.as_str()).collect();
    let mut header: Vec<&str> = vec!["id", "name"];
    header.extend(names.iter().copied());
    header.extend(["weighted_total", "letter"]);
    wtr.write_record(&header).context("failed to write header")?;

    let rows = generate_class_report(course, true);
    for r in &rows {
        let student = course.student(&r.id);
        let mut record: Vec<String> = vec![r.id.clone(), r.name.clone()];
        for name in &names {
            let cell = student
                .and_then(|s| s.score(name))
                .map(|v| v.to_string())
                .unwrap_or_default();
            record.push(cell);
        }
        record.push(r.weighted_total.to_string());
        record.push(r.letter.map(|l| l.as_str()).unwrap_or("").to_string());
        wtr.write_record(&record)
            .with_context(|| format!("failed to write row for {}", r.id))?;
    }
    wtr.flush().context("failed to flush csv")?;
    Ok(rows.len())
}
