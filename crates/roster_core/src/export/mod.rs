//! File export for record dumps and the aggregate report.
//!
//! # Responsibility
//! - Serialize the full record set to a CSV file.
//! - Serialize the rendered aggregate report to a plain-text file.
//!
//! # Invariants
//! - Exports are fire-and-forget reads; they never mutate the store.
//! - Failures surface as `ExportError` and leave no partial contract with
//!   the caller beyond whatever bytes reached disk.

use crate::model::student::Student;
use crate::repo::student_repo::{RepoError, StudentListQuery, StudentRepository};
use crate::report::render_report;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const CSV_HEADER: &str =
    "id,name,roll_number,email,phone,course,year,attendance,grade,created_at,updated_at";

/// Error raised by export operations.
#[derive(Debug)]
pub enum ExportError {
    /// Destination write failed (permissions, missing directory, ...).
    Io(std::io::Error),
    /// Reading the record set back from the store failed.
    Repo(RepoError),
}

impl Display for ExportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "export write failed: {err}"),
            Self::Repo(err) => write!(f, "export read failed: {err}"),
        }
    }
}

impl Error for ExportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for ExportError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RepoError> for ExportError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Writes the full record set to `path` as CSV and returns the row count
/// (excluding the header).
pub fn export_csv<R: StudentRepository>(
    repo: &R,
    path: impl AsRef<Path>,
) -> Result<usize, ExportError> {
    let path = path.as_ref();
    let students = repo.list(&StudentListQuery::default())?;

    let mut contents = String::from(CSV_HEADER);
    contents.push('\n');
    for student in &students {
        contents.push_str(&student_csv_row(student));
        contents.push('\n');
    }

    match std::fs::write(path, contents) {
        Ok(()) => {
            info!(
                "event=export_csv module=export status=ok rows={} path={}",
                students.len(),
                path.display()
            );
            Ok(students.len())
        }
        Err(err) => {
            error!(
                "event=export_csv module=export status=error path={} error={}",
                path.display(),
                err
            );
            Err(err.into())
        }
    }
}

/// Writes the rendered aggregate report to `path` as plain text.
pub fn export_report<R: StudentRepository>(
    repo: &R,
    path: impl AsRef<Path>,
) -> Result<(), ExportError> {
    let path = path.as_ref();
    let report = repo.aggregate()?;
    let text = render_report(&report);

    match std::fs::write(path, text) {
        Ok(()) => {
            info!(
                "event=export_report module=export status=ok total={} path={}",
                report.total_students,
                path.display()
            );
            Ok(())
        }
        Err(err) => {
            error!(
                "event=export_report module=export status=error path={} error={}",
                path.display(),
                err
            );
            Err(err.into())
        }
    }
}

fn student_csv_row(student: &Student) -> String {
    [
        student.id.to_string(),
        csv_field(&student.name),
        csv_field(&student.roll_number),
        csv_field(student.email.as_deref().unwrap_or("")),
        csv_field(student.phone.as_deref().unwrap_or("")),
        csv_field(&student.course),
        student.year.to_string(),
        student.attendance.to_string(),
        student.grade.to_string(),
        student.created_at.to_string(),
        student.updated_at.to_string(),
    ]
    .join(",")
}

/// Quotes a field when it contains a delimiter, quote, or line break.
fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}
