//! Aggregate reporting over the student record set.
//!
//! # Responsibility
//! - Define the read model returned by `StudentRepository::aggregate`.
//! - Render that model into the plain-text report layout.
//!
//! # Invariants
//! - The report is recomputed on demand; nothing here caches or
//!   incrementally maintains state.
//! - Mean attendance/grade are computed over records with a value > 0.

use chrono::Local;

/// Number of students enrolled in one course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseCount {
    pub course: String,
    pub students: i64,
}

/// Read-only summary computed over the current record set.
#[derive(Debug, Clone, PartialEq)]
pub struct AggregateReport {
    /// Total record count; always equals the length of an unfiltered list.
    pub total_students: i64,
    /// Mean attendance over records with attendance > 0, else 0.
    pub mean_attendance: f64,
    /// Mean grade over records with grade > 0, else 0.
    pub mean_grade: f64,
    /// Per-course record counts, ordered by course name.
    pub courses: Vec<CourseCount>,
}

/// Renders the report as plain text, stamped with the current local time.
pub fn render_report(report: &AggregateReport) -> String {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    render_report_at(report, &generated_at)
}

/// Renders the report with a caller-provided timestamp line.
///
/// Split out so tests can assert on deterministic output.
pub fn render_report_at(report: &AggregateReport, generated_at: &str) -> String {
    let mut text = format!(
        "STUDENT RECORDS REPORT\n\
         Generated on: {generated_at}\n\
         \n\
         === SUMMARY STATISTICS ===\n\
         Total Students: {}\n\
         Average Attendance: {:.2}%\n\
         Average Grade: {:.2}/10\n\
         \n\
         === COURSE DISTRIBUTION ===\n",
        report.total_students, report.mean_attendance, report.mean_grade
    );

    for entry in &report.courses {
        text.push_str(&format!("{}: {} students\n", entry.course, entry.students));
    }

    text
}
