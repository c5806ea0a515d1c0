//! Student repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide stable CRUD and aggregate-report APIs over the `students`
//!   table.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Write paths validate typed inputs before SQL mutations.
//! - `roll_number` uniqueness is enforced by the schema; violations map to
//!   `RepoError::DuplicateRollNumber`, never a raw SQLite error.
//! - Timestamps are stamped store-side in epoch milliseconds;
//!   `created_at` is written once and never updated.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::student::{
    NewStudent, Student, StudentId, StudentPatch, StudentValidationError,
};
use crate::report::{AggregateReport, CourseCount};
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const STUDENT_SELECT_SQL: &str = "SELECT
    id,
    name,
    roll_number,
    email,
    phone,
    course,
    year,
    attendance,
    grade,
    created_at,
    updated_at
FROM students";

const STUDENT_COLUMNS: &[&str] = &[
    "id",
    "name",
    "roll_number",
    "email",
    "phone",
    "course",
    "year",
    "attendance",
    "grade",
    "created_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for student persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Validation(StudentValidationError),
    Db(DbError),
    /// A record with this roll number already exists; recoverable by the
    /// caller, the store is left unchanged.
    DuplicateRollNumber(String),
    NotFound(StudentId),
    InvalidData(String),
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::DuplicateRollNumber(roll) => {
                write!(f, "roll number `{roll}` already exists")
            }
            Self::NotFound(id) => write!(f, "student not found: {id}"),
            Self::InvalidData(message) => {
                write!(f, "invalid persisted student data: {message}")
            }
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}; run migrations first"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "required table `{table}` is missing")
            }
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<StudentValidationError> for RepoError {
    fn from(value: StudentValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Filter options for listing students.
///
/// The default query returns every record in insertion (`id`) order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentListQuery {
    /// Optional exact course match.
    pub course: Option<String>,
    /// Optional case-insensitive name substring match.
    pub name_contains: Option<String>,
}

/// Repository interface for student CRUD and reporting operations.
pub trait StudentRepository {
    /// Inserts one record and returns its store-assigned id.
    fn create(&self, student: &NewStudent) -> RepoResult<StudentId>;
    /// Lists records matching the query, ordered by id.
    fn list(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>>;
    /// Gets one record by id.
    fn get(&self, id: StudentId) -> RepoResult<Option<Student>>;
    /// Replaces all mutable fields of one record and refreshes
    /// `updated_at`.
    fn update(&self, id: StudentId, patch: &StudentPatch) -> RepoResult<()>;
    /// Hard-deletes one record.
    fn delete(&self, id: StudentId) -> RepoResult<()>;
    /// Recomputes the aggregate report over the current record set.
    fn aggregate(&self) -> RepoResult<AggregateReport>;
}

/// SQLite-backed student repository.
pub struct SqliteStudentRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteStudentRepository<'conn> {
    /// Constructs a repository after verifying the connection is migrated
    /// and carries the expected schema.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl StudentRepository for SqliteStudentRepository<'_> {
    fn create(&self, student: &NewStudent) -> RepoResult<StudentId> {
        student.validate()?;

        let result = self.conn.execute(
            "INSERT INTO students (
                name,
                roll_number,
                email,
                phone,
                course,
                year,
                attendance,
                grade,
                created_at,
                updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8,
                (strftime('%s', 'now') * 1000),
                (strftime('%s', 'now') * 1000)
            );",
            params![
                student.name.as_str(),
                student.roll_number.as_str(),
                student.email.as_deref(),
                student.phone.as_deref(),
                student.course.as_str(),
                student.year,
                student.attendance,
                student.grade,
            ],
        );

        match result {
            Ok(_) => Ok(self.conn.last_insert_rowid()),
            Err(rusqlite::Error::SqliteFailure(err, _))
                if err.code == rusqlite::ErrorCode::ConstraintViolation =>
            {
                Err(RepoError::DuplicateRollNumber(student.roll_number.clone()))
            }
            Err(err) => Err(err.into()),
        }
    }

    fn list(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        let mut sql = format!("{STUDENT_SELECT_SQL} WHERE 1 = 1");
        let mut bind_values: Vec<Value> = Vec::new();

        if let Some(course) = query.course.as_ref() {
            sql.push_str(" AND course = ?");
            bind_values.push(Value::Text(course.clone()));
        }

        if let Some(fragment) = query.name_contains.as_ref() {
            sql.push_str(" AND name LIKE ? COLLATE NOCASE");
            bind_values.push(Value::Text(format!("%{fragment}%")));
        }

        sql.push_str(" ORDER BY id ASC");

        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut students = Vec::new();
        while let Some(row) = rows.next()? {
            students.push(parse_student_row(row)?);
        }

        Ok(students)
    }

    fn get(&self, id: StudentId) -> RepoResult<Option<Student>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{STUDENT_SELECT_SQL} WHERE id = ?1;"))?;

        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_student_row(row)?));
        }

        Ok(None)
    }

    fn update(&self, id: StudentId, patch: &StudentPatch) -> RepoResult<()> {
        patch.validate()?;

        let changed = self.conn.execute(
            "UPDATE students
             SET
                name = ?1,
                email = ?2,
                phone = ?3,
                course = ?4,
                year = ?5,
                attendance = ?6,
                grade = ?7,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?8;",
            params![
                patch.name.as_str(),
                patch.email.as_deref(),
                patch.phone.as_deref(),
                patch.course.as_str(),
                patch.year,
                patch.attendance,
                patch.grade,
                id,
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn delete(&self, id: StudentId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM students WHERE id = ?1;", [id])?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        Ok(())
    }

    fn aggregate(&self) -> RepoResult<AggregateReport> {
        let total_students: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM students;", [], |row| row.get(0))?;

        // AVG over an empty filtered set yields NULL; the report shows 0.
        let mean_attendance: f64 = self
            .conn
            .query_row(
                "SELECT AVG(attendance) FROM students WHERE attendance > 0;",
                [],
                |row| row.get::<_, Option<f64>>(0),
            )?
            .unwrap_or(0.0);

        let mean_grade: f64 = self
            .conn
            .query_row(
                "SELECT AVG(grade) FROM students WHERE grade > 0;",
                [],
                |row| row.get::<_, Option<f64>>(0),
            )?
            .unwrap_or(0.0);

        let mut stmt = self.conn.prepare(
            "SELECT course, COUNT(*)
             FROM students
             GROUP BY course
             ORDER BY course ASC;",
        )?;
        let mut rows = stmt.query([])?;
        let mut courses = Vec::new();
        while let Some(row) = rows.next()? {
            courses.push(CourseCount {
                course: row.get(0)?,
                students: row.get(1)?,
            });
        }

        Ok(AggregateReport {
            total_students,
            mean_attendance,
            mean_grade,
            courses,
        })
    }
}

fn parse_student_row(row: &Row<'_>) -> RepoResult<Student> {
    let created_at: i64 = row.get("created_at")?;
    let updated_at: i64 = row.get("updated_at")?;
    if updated_at < created_at {
        return Err(RepoError::InvalidData(format!(
            "updated_at {updated_at} is earlier than created_at {created_at}"
        )));
    }

    Ok(Student {
        id: row.get("id")?,
        name: row.get("name")?,
        roll_number: row.get("roll_number")?,
        email: row.get("email")?,
        phone: row.get("phone")?,
        course: row.get("course")?,
        year: row.get("year")?,
        attendance: row.get("attendance")?,
        grade: row.get("grade")?,
        created_at,
        updated_at,
    })
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 =
        conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    if !table_exists(conn, "students")? {
        return Err(RepoError::MissingRequiredTable("students"));
    }

    for column in STUDENT_COLUMNS.iter().copied() {
        if !table_has_column(conn, "students", column)? {
            return Err(RepoError::MissingRequiredColumn {
                table: "students",
                column,
            });
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1
            FROM sqlite_master
            WHERE type = 'table' AND name = ?1
        );",
        [table],
        |row| row.get(0),
    )?;
    Ok(exists == 1)
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
