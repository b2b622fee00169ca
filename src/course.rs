use crate::error::GradebookError;
use serde::Serialize;
use std::collections::HashMap;

pub const DEFAULT_MAX_SCORE: f64 = 100.0;

/// Weight given to assignments created implicitly by bulk ingestion.
/// Zero keeps them out of weighted totals until an operator sets a real weight.
pub const AUTO_CREATED_WEIGHT: f64 = 0.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub name: String,
    pub weight: f64,
    pub max_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub assignment: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Student {
    pub id: String,
    pub name: String,
    scores: Vec<ScoreEntry>,
    score_index: HashMap<String, usize>,
}

impl Student {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            scores: Vec::new(),
            score_index: HashMap::new(),
        }
    }

    pub fn score(&self, assignment: &str) -> Option<f64> {
        self.score_index.get(assignment).map(|&i| self.scores[i].score)
    }

    /// Last write wins; an overwritten score keeps its original position.
    pub fn set_score(&mut self, assignment: &str, score: f64) {
        if let Some(&i) = self.score_index.get(assignment) {
            self.scores[i].score = score;
            return;
        }
        self.score_index.insert(assignment.to_string(), self.scores.len());
        self.scores.push(ScoreEntry {
            assignment: assignment.to_string(),
            score,
        });
    }

    /// Recorded scores in entry order.
    pub fn scores(&self) -> &[ScoreEntry] {
        &self.scores
    }
}

/// Assignment name -> (weight, max_score), in creation order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AssignmentCatalog {
    assignments: Vec<Assignment>,
    index: HashMap<String, usize>,
}

impl AssignmentCatalog {
    /// Weight and max score are stored as given; out-of-range values are the
    /// caller's business and the scoring engine tolerates them.
    pub fn add(&mut self, name: &str, weight: f64, max_score: f64) -> Result<(), GradebookError> {
        if self.index.contains_key(name) {
            return Err(GradebookError::DuplicateAssignment(name.to_string()));
        }
        self.index.insert(name.to_string(), self.assignments.len());
        self.assignments.push(Assignment {
            name: name.to_string(),
            weight,
            max_score,
        });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Assignment> {
        self.index.get(name).map(|&i| &self.assignments[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Registers `name` with the auto-creation defaults if it is unknown.
    /// Returns true when a new assignment was created.
    pub fn ensure_registered(&mut self, name: &str) -> bool {
        if self.contains(name) {
            return false;
        }
        self.index.insert(name.to_string(), self.assignments.len());
        self.assignments.push(Assignment {
            name: name.to_string(),
            weight: AUTO_CREATED_WEIGHT,
            max_score: DEFAULT_MAX_SCORE,
        });
        true
    }

    pub fn update(
        &mut self,
        name: &str,
        weight: Option<f64>,
        max_score: Option<f64>,
    ) -> Result<&Assignment, GradebookError> {
        let Some(&i) = self.index.get(name) else {
            return Err(GradebookError::AssignmentNotFound(name.to_string()));
        };
        let a = &mut self.assignments[i];
        if let Some(w) = weight {
            a.weight = w;
        }
        if let Some(m) = max_score {
            a.max_score = m;
        }
        Ok(a)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Assignment> {
        self.assignments.iter()
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

}

/// Aggregate root: the only owner of a course's students and assignments.
#[derive(Debug, Clone, PartialEq)]
pub struct Course {
    pub code: String,
    pub title: String,
    students: Vec<Student>,
    student_index: HashMap<String, usize>,
    catalog: AssignmentCatalog,
}

impl Course {
    pub fn new(code: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            title: title.into(),
            students: Vec::new(),
            student_index: HashMap::new(),
            catalog: AssignmentCatalog::default(),
        }
    }

    /// Students in insertion order.
    pub fn students(&self) -> &[Student] {
        &self.students
    }

    pub fn student(&self, id: &str) -> Option<&Student> {
        self.student_index.get(id).map(|&i| &self.students[i])
    }

    pub fn student_mut(&mut self, id: &str) -> Option<&mut Student> {
        let i = *self.student_index.get(id)?;
        Some(&mut self.students[i])
    }

    pub fn has_student(&self, id: &str) -> bool {
        self.student_index.contains_key(id)
    }

    /// Returns false (and changes nothing) if the id is already enrolled.
    pub fn add_student(&mut self, id: &str, name: &str) -> bool {
        if self.has_student(id) {
            return false;
        }
        self.student_index.insert(id.to_string(), self.students.len());
        self.students.push(Student::new(id, name));
        true
    }

    pub fn catalog(&self) -> &AssignmentCatalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut AssignmentCatalog {
        &mut self.catalog
    }

    pub fn add_assignment(
        &mut self,
        name: &str,
        weight: f64,
        max_score: f64,
    ) -> Result<(), GradebookError> {
        self.catalog.add(name, weight, max_score)
    }

    /// Single-grade entry. Both keys must already exist.
    pub fn enter_grade(
        &mut self,
        student_id: &str,
        assignment_name: &str,
        score: f64,
    ) -> Result<(), GradebookError> {
        if !self.catalog.contains(assignment_name) && self.has_student(student_id) {
            return Err(GradebookError::AssignmentNotFound(
                assignment_name.to_string(),
            ));
        }
        let Some(student) = self.student_mut(student_id) else {
            return Err(GradebookError::StudentNotFound(student_id.to_string()));
        };
        student.set_score(assignment_name, score);
        Ok(())
    }

    /// Roster rows are `id[,name]`. Blank ids are skipped, a missing or blank
    /// name falls back to the id, and enrolled ids are left untouched.
    pub fn import_roster(&mut self, rows: &[Vec<String>]) -> usize {
        let mut added = 0;
        for row in rows {
            let Some(id) = row.first().map(|s| s.trim()) else {
                continue;
            };
            if id.is_empty() {
                continue;
            }
            let name = row
                .get(1)
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .unwrap_or(id);
            if self.add_student(id, name) {
                added += 1;
            }
        }
        added
    }

    /// Small fixed course used for walkthroughs.
    pub fn demo(code: &str) -> Self {
        let mut c = Course::new(code, "Demo Course");
        c.add_student("s1", "Alice");
        c.add_student("s2", "Bob");
        c.add_student("s3", "Charlie");
        c.add_assignment("HW1", 0.3, 20.0).ok();
        c.add_assignment("Exam", 0.7, 100.0).ok();
        for (id, hw, exam) in [("s1", 18.0, 85.0), ("s2", 12.0, 70.0), ("s3", 19.0, 95.0)] {
            if let Some(s) = c.student_mut(id) {
                s.set_score("HW1", hw);
                s.set_score("Exam", exam);
            }
        }
        c
    }
}
