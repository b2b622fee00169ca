use crate::course::Course;
use anyhow::Context;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info};

/// Shape of a bulk grade file, decided once from its first row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GradeLayout {
    /// `id,<assignment>,<assignment>,...` header, then one row per student.
    Wide { assignment_names: Vec<String> },
    /// One `id,assignment,score` triple per row, no header.
    Narrow,
}

impl GradeLayout {
    pub fn detect(rows: &[Vec<String>]) -> Self {
        let Some(first) = rows.first() else {
            return GradeLayout::Narrow;
        };
        match first.first() {
            Some(cell) if cell.trim().eq_ignore_ascii_case("id") => GradeLayout::Wide {
                assignment_names: first[1..].iter().map(|h| h.trim().to_string()).collect(),
            },
            _ => GradeLayout::Narrow,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GradeLayout::Wide { .. } => "wide",
            GradeLayout::Narrow => "narrow",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub layout: &'static str,
    pub processed: usize,
    pub failed: usize,
}

/// Finite numbers only; blanks, text, NaN and infinities are not scores.
fn parse_score(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Applies tokenized grade rows to `course`.
///
/// Bad rows are counted, never raised, and never roll back earlier rows.
/// Unknown assignment names are registered with the auto-creation defaults.
pub fn ingest_grade_rows(course: &mut Course, rows: &[Vec<String>]) -> IngestSummary {
    let layout = GradeLayout::detect(rows);
    let (processed, failed) = match &layout {
        GradeLayout::Wide { assignment_names } => ingest_wide(course, assignment_names, &rows[1..]),
        GradeLayout::Narrow => ingest_narrow(course, rows),
    };
    info!(
        course = %course.code,
        layout = layout.as_str(),
        processed,
        failed,
        "grade rows ingested"
    );
    IngestSummary {
        layout: layout.as_str(),
        processed,
        failed,
    }
}

fn ingest_wide(course: &mut Course, names: &[String], rows: &[Vec<String>]) -> (usize, usize) {
    let mut processed = 0;
    let mut failed = 0;

    for (i, row) in rows.iter().enumerate() {
        let Some(sid) = row.first().map(|f| f.trim()) else {
            continue;
        };
        if !course.has_student(sid) {
            debug!(row = i + 2, student_id = sid, "unknown student, row rejected");
            failed += 1;
            continue;
        }

        for (col, name) in names.iter().enumerate() {
            let Some(cell) = row.get(col + 1) else {
                continue;
            };
            if cell.trim().is_empty() {
                continue;
            }
            let Some(score) = parse_score(cell) else {
                debug!(row = i + 2, assignment = %name, cell = %cell, "non-numeric cell skipped");
                continue;
            };
            if course.catalog_mut().ensure_registered(name) {
                info!(assignment = %name, "assignment auto-created with zero weight");
            }
            if let Some(student) = course.student_mut(sid) {
                student.set_score(name, score);
            }
        }
        // A matched row counts once, even when none of its cells applied.
        processed += 1;
    }

    (processed, failed)
}

fn ingest_narrow(course: &mut Course, rows: &[Vec<String>]) -> (usize, usize) {
    let mut processed = 0;
    let mut failed = 0;

    for (i, row) in rows.iter().enumerate() {
        if row.len() < 3 {
            debug!(row = i + 1, fields = row.len(), "short row rejected");
            failed += 1;
            continue;
        }
        let (sid, name) = (row[0].trim(), row[1].trim());
        let Some(score) = parse_score(&row[2]) else {
            debug!(row = i + 1, cell = %row[2], "non-numeric score rejected");
            failed += 1;
            continue;
        };
        let Some(student) = course.student_mut(sid) else {
            debug!(row = i + 1, student_id = sid, "unknown student, row rejected");
            failed += 1;
            continue;
        };
        student.set_score(name, score);
        if course.catalog_mut().ensure_registered(name) {
            info!(assignment = name, "assignment auto-created with zero weight");
        }
        processed += 1;
    }

    (processed, failed)
}

/// Tokenizes a CSV file into trimmed string rows. Ragged rows are kept as-is
/// and a blank line yields an empty row; layout and row validity are decided
/// by the caller.
pub fn read_csv_rows(path: &Path) -> anyhow::Result<Vec<Vec<String>>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to open csv {}", path.to_string_lossy()))?;
    split_csv_rows(&text).with_context(|| format!("failed to read {}", path.to_string_lossy()))
}

/// The csv reader drops blank lines, so records are fed to it one logical
/// line at a time. A line only closes a record once its quotes balance.
fn split_csv_rows(text: &str) -> anyhow::Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();
    let mut pending = String::new();
    let mut quotes = 0usize;

    for line in text.lines() {
        if pending.is_empty() && line.is_empty() {
            rows.push(Vec::new());
            continue;
        }
        pending.push_str(line);
        pending.push('\n');
        quotes += line.matches('"').count();
        if quotes % 2 == 0 {
            rows.extend(tokenize_records(&pending, rows.len())?);
            pending.clear();
            quotes = 0;
        }
    }
    if !pending.is_empty() {
        rows.extend(tokenize_records(&pending, rows.len())?);
    }
    Ok(rows)
}

fn tokenize_records(chunk: &str, rows_before: usize) -> anyhow::Result<Vec<Vec<String>>> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(chunk.as_bytes());

    let mut rows = Vec::new();
    for record in rdr.records() {
        let record = record.with_context(|| format!("failed to read row {}", rows_before + 1))?;
        rows.push(record.iter().map(|f| f.to_string()).collect());
    }
    Ok(rows)
}
