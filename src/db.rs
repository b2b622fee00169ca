use crate::course::Course;
use rusqlite::{Connection, OptionalExtension};
use serde::Serialize;
use std::path::Path;
use tracing::debug;

pub const DB_FILE_NAME: &str = "gradebook.sqlite3";

pub fn open_db(workspace: &Path) -> anyhow::Result<Connection> {
    std::fs::create_dir_all(workspace)?;
    let db_path = workspace.join(DB_FILE_NAME);
    let conn = Connection::open(db_path)?;
    conn.execute("PRAGMA foreign_keys = ON", [])?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS courses(
            code TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            updated_at TEXT
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS students(
            course_code TEXT NOT NULL,
            id TEXT NOT NULL,
            name TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            PRIMARY KEY(course_code, id),
            FOREIGN KEY(course_code) REFERENCES courses(code)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_students_course_sort ON students(course_code, sort_order)",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS assignments(
            course_code TEXT NOT NULL,
            name TEXT NOT NULL,
            weight REAL NOT NULL,
            max_score REAL NOT NULL,
            sort_order INTEGER NOT NULL,
            PRIMARY KEY(course_code, name),
            FOREIGN KEY(course_code) REFERENCES courses(code)
        )",
        [],
    )?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS scores(
            course_code TEXT NOT NULL,
            student_id TEXT NOT NULL,
            assignment_name TEXT NOT NULL,
            score REAL NOT NULL,
            sort_order INTEGER NOT NULL,
            PRIMARY KEY(course_code, student_id, assignment_name),
            FOREIGN KEY(course_code, student_id) REFERENCES students(course_code, id),
            FOREIGN KEY(course_code, assignment_name) REFERENCES assignments(course_code, name)
        )",
        [],
    )?;
    conn.execute(
        "CREATE INDEX IF NOT EXISTS idx_scores_course ON scores(course_code)",
        [],
    )?;

    Ok(conn)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListing {
    pub course_code: String,
    pub title: String,
}

pub fn list_courses(conn: &Connection) -> anyhow::Result<Vec<CourseListing>> {
    let mut stmt = conn.prepare("SELECT code, title FROM courses ORDER BY code")?;
    let rows = stmt
        .query_map([], |r| {
            Ok(CourseListing {
                course_code: r.get(0)?,
                title: r.get(1)?,
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

pub fn course_exists(conn: &Connection, code: &str) -> anyhow::Result<bool> {
    let found: Option<i64> = conn
        .query_row("SELECT 1 FROM courses WHERE code = ?", [code], |r| r.get(0))
        .optional()?;
    Ok(found.is_some())
}

/// Rebuilds a course in its stored insertion order. None if the code is unknown.
pub fn load_course(conn: &Connection, code: &str) -> anyhow::Result<Option<Course>> {
    let title: Option<String> = conn
        .query_row("SELECT title FROM courses WHERE code = ?", [code], |r| {
            r.get(0)
        })
        .optional()?;
    let Some(title) = title else {
        return Ok(None);
    };
    let mut course = Course::new(code, title);

    let mut stud_stmt = conn.prepare(
        "SELECT id, name FROM students WHERE course_code = ? ORDER BY sort_order",
    )?;
    let students = stud_stmt
        .query_map([code], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    for (id, name) in &students {
        course.add_student(id, name);
    }

    let mut assess_stmt = conn.prepare(
        "SELECT name, weight, max_score FROM assignments WHERE course_code = ? ORDER BY sort_order",
    )?;
    let assignments = assess_stmt
        .query_map([code], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, f64>(1)?,
                r.get::<_, f64>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (name, weight, max_score) in &assignments {
        course.add_assignment(name, *weight, *max_score)?;
    }

    let mut score_stmt = conn.prepare(
        "SELECT student_id, assignment_name, score
         FROM scores
         WHERE course_code = ?
         ORDER BY student_id, sort_order",
    )?;
    let scores = score_stmt
        .query_map([code], |r| {
            Ok((
                r.get::<_, String>(0)?,
                r.get::<_, String>(1)?,
                r.get::<_, f64>(2)?,
            ))
        })?
        .collect::<Result<Vec<_>, _>>()?;
    for (student_id, assignment, score) in &scores {
        if let Some(s) = course.student_mut(student_id) {
            s.set_score(assignment, *score);
        }
    }

    Ok(Some(course))
}

/// Replaces every stored row of `course` in a single transaction.
pub fn save_course(conn: &Connection, course: &Course) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    let code = course.code.as_str();

    // Children first; the schema has no ON DELETE CASCADE.
    tx.execute("DELETE FROM scores WHERE course_code = ?", [code])?;
    tx.execute("DELETE FROM students WHERE course_code = ?", [code])?;
    tx.execute("DELETE FROM assignments WHERE course_code = ?", [code])?;

    let updated_at = chrono::Utc::now().to_rfc3339();
    tx.execute(
        "INSERT INTO courses(code, title, updated_at) VALUES(?, ?, ?)
         ON CONFLICT(code) DO UPDATE SET
           title = excluded.title,
           updated_at = excluded.updated_at",
        (code, course.title.as_str(), updated_at.as_str()),
    )?;

    {
        let mut ins_assignment = tx.prepare(
            "INSERT INTO assignments(course_code, name, weight, max_score, sort_order)
             VALUES(?, ?, ?, ?, ?)",
        )?;
        for (i, a) in course.catalog().iter().enumerate() {
            ins_assignment.execute((code, a.name.as_str(), a.weight, a.max_score, i as i64))?;
        }

        let mut ins_student = tx.prepare(
            "INSERT INTO students(course_code, id, name, sort_order) VALUES(?, ?, ?, ?)",
        )?;
        let mut ins_score = tx.prepare(
            "INSERT INTO scores(course_code, student_id, assignment_name, score, sort_order)
             VALUES(?, ?, ?, ?, ?)",
        )?;
        for (i, s) in course.students().iter().enumerate() {
            ins_student.execute((code, s.id.as_str(), s.name.as_str(), i as i64))?;
            for (j, e) in s.scores().iter().enumerate() {
                ins_score.execute((code, s.id.as_str(), e.assignment.as_str(), e.score, j as i64))?;
            }
        }
    }

    tx.commit()?;
    debug!(
        course = %course.code,
        students = course.students().len(),
        assignments = course.catalog().len(),
        "course saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn course_roundtrips_losslessly() {
        let dir = tempfile::tempdir().expect("tempdir");
        let conn = open_db(dir.path()).expect("open db");

        let mut course = Course::new("phys201", "Physics II");
        course.add_student("z9", "Zed");
        course.add_student("a1", "Ann");
        course.add_assignment("Lab", 0.1 + 0.2, 7.0).expect("lab");
        course.add_assignment("Final", 1.75, 0.0).expect("final");
        course.catalog_mut().ensure_registered("Extra");
        course.enter_grade("z9", "Final", 1.0 / 3.0).expect("grade");
        course.enter_grade("z9", "Lab", 6.25).expect("grade");
        course.enter_grade("a1", "Extra", -0.0001).expect("grade");

        save_course(&conn, &course).expect("save");
        let loaded = load_course(&conn, "phys201")
            .expect("load")
            .expect("course present");
        assert_eq!(loaded, course);

        let ids: Vec<&str> = loaded.students().iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["z9", "a1"]);
        let z9_order: Vec<&str> = loaded.students()[0]
            .scores()
            .iter()
            .map(|e| e.assignment.as_str())
            .collect();
        assert_eq!(z9_order, vec!["Final", "Lab"]);
    }

    #[test]
    fn save_replaces_previous_rows() {
        let dir = tempfile::tempdir().expect("tempdir");
        let conn = open_db(dir.path()).expect("open db");

        let mut course = Course::demo("demo101");
        save_course(&conn, &course).expect("save demo");

        course.title = "Renamed".to_string();
        course.catalog_mut().update("HW1", Some(0.5), None).expect("update");
        save_course(&conn, &course).expect("save again");

        let loaded = load_course(&conn, "demo101").expect("load").expect("present");
        assert_eq!(loaded, course);
        assert_eq!(list_courses(&conn).expect("list").len(), 1);
    }

    #[test]
    fn unknown_course_loads_as_none() {
        let dir = tempfile::tempdir().expect("tempdir");
        let conn = open_db(dir.path()).expect("open db");
        assert!(load_course(&conn, "nope").expect("load").is_none());
        assert!(!course_exists(&conn, "nope").expect("exists"));
    }
}
