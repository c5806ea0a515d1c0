//! Core domain logic for the student roster.
//! This crate is the single source of truth for record-store invariants.

pub mod db;
pub mod export;
pub mod logging;
pub mod model;
pub mod repo;
pub mod report;
pub mod service;
pub mod shell;

pub use export::{export_csv, export_report, ExportError};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::student::{
    NewStudent, Student, StudentId, StudentPatch, StudentValidationError, COURSE_SUGGESTIONS,
};
pub use repo::student_repo::{
    RepoError, RepoResult, SqliteStudentRepository, StudentListQuery, StudentRepository,
};
pub use report::{render_report, render_report_at, AggregateReport, CourseCount};
pub use service::student_service::StudentService;
pub use shell::{Shell, ShellError, ShellResult, StudentForm};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
