use serde_json::json;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;
use std::process::{Child, ChildStdin, ChildStdout, Command, Stdio};

fn spawn_sidecar() -> (Child, ChildStdin, BufReader<ChildStdout>) {
    let exe = env!("CARGO_BIN_EXE_gradebookd");
    let mut child = Command::new(exe)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .spawn()
        .expect("spawn gradebookd");
    let stdin = child.stdin.take().expect("child stdin");
    let stdout = child.stdout.take().expect("child stdout");
    (child, stdin, BufReader::new(stdout))
}

fn request_ok(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    id: &str,
    method: &str,
    params: serde_json::Value,
) -> serde_json::Value {
    let payload = json!({ "id": id, "method": method, "params": params });
    writeln!(stdin, "{}", payload).expect("write request");
    stdin.flush().expect("flush request");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read response line");
    let value: serde_json::Value = serde_json::from_str(line.trim()).expect("parse response json");
    assert_eq!(value.get("id").and_then(|v| v.as_str()), Some(id));
    assert!(
        value.get("ok").and_then(|v| v.as_bool()).unwrap_or(false),
        "{} failed: {}",
        method,
        value
    );
    value.get("result").cloned().unwrap_or_else(|| json!({}))
}

fn setup_course(
    stdin: &mut ChildStdin,
    reader: &mut BufReader<ChildStdout>,
    workspace: &Path,
    code: &str,
) {
    let roster = workspace.join(format!("{}-roster.csv", code));
    std::fs::write(&roster, "s1,Alice\ns2,Bob\ns3,Charlie\n").expect("write roster");
    request_ok(
        stdin,
        reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        stdin,
        reader,
        "create",
        "courses.create",
        json!({ "courseCode": code, "title": "Bulk" }),
    );
    let imported = request_ok(
        stdin,
        reader,
        "roster",
        "students.importCsv",
        json!({ "courseCode": code, "path": roster.to_string_lossy() }),
    );
    assert_eq!(imported.get("imported").and_then(|v| v.as_u64()), Some(3));
}

fn counts(result: &serde_json::Value) -> (u64, u64) {
    (
        result.get("processed").and_then(|v| v.as_u64()).expect("processed"),
        result.get("failed").and_then(|v| v.as_u64()).expect("failed"),
    )
}

#[test]
fn narrow_rows_with_unknown_student_or_bad_score_are_counted_failed() {
    let workspace = tempfile::tempdir().expect("tempdir");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    setup_course(&mut stdin, &mut reader, workspace.path(), "narrow");

    let csv = workspace.path().join("narrow.csv");
    std::fs::write(&csv, "s1,HW1,18\nghost,HW1,12\ns2,HW1,twelve\n").expect("write csv");
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "bulk",
        "grades.bulkImportCsv",
        json!({ "courseCode": "narrow", "path": csv.to_string_lossy() }),
    );
    assert_eq!(result.get("layout").and_then(|v| v.as_str()), Some("narrow"));
    assert_eq!(counts(&result), (1, 2));

    let report = request_ok(
        &mut stdin,
        &mut reader,
        "report",
        "reports.classReport",
        json!({ "courseCode": "narrow" }),
    );
    let rows = report.get("rows").and_then(|v| v.as_array()).expect("rows");
    let s1_scores = rows[0].get("scores").and_then(|v| v.as_array()).expect("scores");
    assert_eq!(s1_scores.len(), 1);
    assert_eq!(s1_scores[0].get("score").and_then(|v| v.as_f64()), Some(18.0));
    let s2_scores = rows[1].get("scores").and_then(|v| v.as_array()).expect("scores");
    assert!(s2_scores.is_empty());
}

#[test]
fn narrow_blank_line_fails_and_blank_assignment_name_is_recorded() {
    let workspace = tempfile::tempdir().expect("tempdir");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    setup_course(&mut stdin, &mut reader, workspace.path(), "gaps");

    let csv = workspace.path().join("gaps.csv");
    std::fs::write(&csv, "s1,HW1,10\n\ns1,HW1,12\ns2,,5\n").expect("write csv");
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "bulk",
        "grades.bulkImportCsv",
        json!({ "courseCode": "gaps", "path": csv.to_string_lossy() }),
    );
    assert_eq!(counts(&result), (3, 1));

    let assignments = request_ok(
        &mut stdin,
        &mut reader,
        "list",
        "assignments.list",
        json!({ "courseCode": "gaps" }),
    );
    assert_eq!(
        assignments,
        json!({ "assignments": [
            { "name": "HW1", "weight": 0.0, "maxScore": 100.0 },
            { "name": "", "weight": 0.0, "maxScore": 100.0 }
        ] })
    );
}

#[test]
fn wide_rows_fail_whole_for_unknown_student_and_skip_bad_cells() {
    let workspace = tempfile::tempdir().expect("tempdir");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    setup_course(&mut stdin, &mut reader, workspace.path(), "wide");

    let csv = workspace.path().join("wide.csv");
    std::fs::write(
        &csv,
        "ID,HW1,Exam\ns1,18,85\nghost,20,100\ns2,,n/a\ns3,19\n",
    )
    .expect("write csv");
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "bulk",
        "grades.bulkImportCsv",
        json!({ "courseCode": "wide", "path": csv.to_string_lossy() }),
    );
    assert_eq!(result.get("layout").and_then(|v| v.as_str()), Some("wide"));
    // s2 matched but applied nothing; it still counts as processed.
    assert_eq!(counts(&result), (3, 1));
}

#[test]
fn reingesting_the_same_wide_file_changes_nothing() {
    let workspace = tempfile::tempdir().expect("tempdir");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    setup_course(&mut stdin, &mut reader, workspace.path(), "again");

    let csv = workspace.path().join("wide.csv");
    std::fs::write(&csv, "id,HW1,Exam\ns1,18,85\ns2,12,70\ns3,19,95\n").expect("write csv");
    let params = json!({ "courseCode": "again", "path": csv.to_string_lossy() });

    request_ok(&mut stdin, &mut reader, "b1", "grades.bulkImportCsv", params.clone());
    let first = request_ok(
        &mut stdin,
        &mut reader,
        "r1",
        "reports.classReport",
        json!({ "courseCode": "again" }),
    );
    request_ok(&mut stdin, &mut reader, "b2", "grades.bulkImportCsv", params);
    let second = request_ok(
        &mut stdin,
        &mut reader,
        "r2",
        "reports.classReport",
        json!({ "courseCode": "again" }),
    );
    assert_eq!(first, second);
}

#[test]
fn unknown_assignment_is_auto_created_with_zero_weight() {
    let workspace = tempfile::tempdir().expect("tempdir");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    setup_course(&mut stdin, &mut reader, workspace.path(), "auto");

    request_ok(
        &mut stdin,
        &mut reader,
        "add",
        "assignments.add",
        json!({ "courseCode": "auto", "name": "Exam", "weight": 1.0 }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "g1",
        "grades.enter",
        json!({ "courseCode": "auto", "studentId": "s1", "assignmentName": "Exam", "score": 80.0 }),
    );
    let before = request_ok(
        &mut stdin,
        &mut reader,
        "t1",
        "calc.weightedScores",
        json!({ "courseCode": "auto" }),
    );

    let csv = workspace.path().join("extra.csv");
    std::fs::write(&csv, "s2,Bonus Lab,100\n").expect("write csv");
    request_ok(
        &mut stdin,
        &mut reader,
        "bulk",
        "grades.bulkImportCsv",
        json!({ "courseCode": "auto", "path": csv.to_string_lossy() }),
    );

    let list = request_ok(
        &mut stdin,
        &mut reader,
        "list",
        "assignments.list",
        json!({ "courseCode": "auto" }),
    );
    let assignments = list.get("assignments").and_then(|v| v.as_array()).expect("assignments");
    let bonus = assignments
        .iter()
        .find(|a| a.get("name").and_then(|v| v.as_str()) == Some("Bonus Lab"))
        .expect("auto-created assignment");
    assert_eq!(bonus.get("weight").and_then(|v| v.as_f64()), Some(0.0));
    assert_eq!(bonus.get("maxScore").and_then(|v| v.as_f64()), Some(100.0));

    let after = request_ok(
        &mut stdin,
        &mut reader,
        "t2",
        "calc.weightedScores",
        json!({ "courseCode": "auto" }),
    );
    assert_eq!(before, after);
}
