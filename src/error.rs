use thiserror::Error;

/// Structural failures of single-item course operations.
///
/// Bulk ingestion never produces these for bad rows; it counts them instead.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GradebookError {
    #[error("assignment with that name already exists: {0}")]
    DuplicateAssignment(String),
    #[error("student not found: {0}")]
    StudentNotFound(String),
    #[error("assignment not found: {0}")]
    AssignmentNotFound(String),
    #[error("course not found: {0}")]
    CourseNotFound(String),
    #[error("course already exists: {0}")]
    CourseExists(String),
}

impl GradebookError {
    /// Stable code used in IPC error envelopes.
    pub fn code(&self) -> &'static str {
        match self {
            GradebookError::DuplicateAssignment(_) => "duplicate_name",
            GradebookError::StudentNotFound(_)
            | GradebookError::AssignmentNotFound(_)
            | GradebookError::CourseNotFound(_) => "not_found",
            GradebookError::CourseExists(_) => "already_exists",
        }
    }
}
