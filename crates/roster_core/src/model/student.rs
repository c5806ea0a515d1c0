//! Student record model.
//!
//! # Responsibility
//! - Define the persisted `Student` shape plus the typed create/update
//!   inputs used by repositories and shells.
//!
//! # Invariants
//! - `id` is assigned by the store and never reused.
//! - `roll_number` is required, unique, and immutable after create.
//! - `updated_at >= created_at` for every persisted record.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Stable surrogate key assigned by the store (SQLite rowid).
pub type StudentId = i64;

/// Well-known course names offered to shells as form suggestions.
///
/// The store treats `course` as a free string; this list is advisory only.
pub const COURSE_SUGGESTIONS: &[&str] = &["BCA", "MCA", "B.Tech", "M.Tech", "BSc CS"];

/// Field-level validation failure raised before any store call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentValidationError {
    EmptyName,
    EmptyRollNumber,
}

impl Display for StudentValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name is required and cannot be empty"),
            Self::EmptyRollNumber => write!(f, "roll number is required and cannot be empty"),
        }
    }
}

impl Error for StudentValidationError {}

/// Canonical persisted student record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    /// Store-assigned surrogate key.
    pub id: StudentId,
    /// Required display name.
    pub name: String,
    /// Required unique identifier; immutable after create.
    pub roll_number: String,
    /// Optional contact email; no format validation by contract.
    pub email: Option<String>,
    /// Optional contact phone; no format validation by contract.
    pub phone: Option<String>,
    /// Course name; free string, see [`COURSE_SUGGESTIONS`].
    pub course: String,
    /// Study year; unconstrained small integer.
    pub year: i64,
    /// Attendance percentage; intentionally not clamped to [0, 100].
    pub attendance: f64,
    /// Grade on the 0-10 scale; intentionally not clamped.
    pub grade: f64,
    /// Creation time in epoch milliseconds, stamped by the store.
    pub created_at: i64,
    /// Last update time in epoch milliseconds, stamped by the store.
    pub updated_at: i64,
}

/// Input model for creating a record; the store assigns id and timestamps.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewStudent {
    pub name: String,
    pub roll_number: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course: String,
    pub year: i64,
    pub attendance: f64,
    pub grade: f64,
}

impl NewStudent {
    /// Checks required fields before persistence.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.name.trim().is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        if self.roll_number.trim().is_empty() {
            return Err(StudentValidationError::EmptyRollNumber);
        }
        Ok(())
    }
}

/// Full replacement of the mutable fields of one record.
///
/// `roll_number` and `created_at` are deliberately absent: the update path
/// cannot touch them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentPatch {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub course: String,
    pub year: i64,
    pub attendance: f64,
    pub grade: f64,
}

impl StudentPatch {
    /// Checks required fields before persistence.
    pub fn validate(&self) -> Result<(), StudentValidationError> {
        if self.name.trim().is_empty() {
            return Err(StudentValidationError::EmptyName);
        }
        Ok(())
    }
}

impl From<&Student> for StudentPatch {
    fn from(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            email: student.email.clone(),
            phone: student.phone.clone(),
            course: student.course.clone(),
            year: student.year,
            attendance: student.attendance,
            grade: student.grade,
        }
    }
}
