//! Interaction shell state machine.
//!
//! # Responsibility
//! - Translate form/list/report user actions into store calls, UI-free so
//!   any front end (or a test) can drive it.
//! - Hold the single editing form, the current selection, and the cached
//!   list view.
//!
//! # Invariants
//! - The shell is either browsing (no selection) or editing one record
//!   (selection set, form loaded from it); a blank form with no selection
//!   is the add path.
//! - Delete is two-phase: `request_delete` arms a confirmation that only
//!   `confirm_delete` executes.
//! - After every successful mutation the cached list is reloaded in full.
//! - A failed add retains the form so the user can correct and resubmit.

use crate::export::{export_csv, export_report, ExportError};
use crate::model::student::{NewStudent, Student, StudentId, StudentPatch};
use crate::repo::student_repo::{RepoError, StudentListQuery, StudentRepository};
use crate::report::AggregateReport;
use crate::service::student_service::StudentService;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

pub type ShellResult<T> = Result<T, ShellError>;

/// Error raised by shell actions.
#[derive(Debug)]
pub enum ShellError {
    /// Update/delete was submitted without a selected record.
    NoSelection,
    /// `confirm_delete` was called with no armed confirmation.
    NoPendingDelete,
    /// Store operation failed; carries the full repository taxonomy.
    Repo(RepoError),
}

impl Display for ShellError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoSelection => write!(f, "select a student record first"),
            Self::NoPendingDelete => write!(f, "no delete is awaiting confirmation"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ShellError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ShellError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// The one-record editing form.
///
/// Optional contact fields are kept as plain strings here (empty means
/// absent) because that is what a form renders; conversion to the typed
/// write models happens on submit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StudentForm {
    pub name: String,
    pub roll_number: String,
    pub email: String,
    pub phone: String,
    pub course: String,
    pub year: i64,
    pub attendance: f64,
    pub grade: f64,
}

impl StudentForm {
    fn from_student(student: &Student) -> Self {
        Self {
            name: student.name.clone(),
            roll_number: student.roll_number.clone(),
            email: student.email.clone().unwrap_or_default(),
            phone: student.phone.clone().unwrap_or_default(),
            course: student.course.clone(),
            year: student.year,
            attendance: student.attendance,
            grade: student.grade,
        }
    }

    fn to_new_student(&self) -> NewStudent {
        NewStudent {
            name: self.name.clone(),
            roll_number: self.roll_number.clone(),
            email: non_empty(&self.email),
            phone: non_empty(&self.phone),
            course: self.course.clone(),
            year: self.year,
            attendance: self.attendance,
            grade: self.grade,
        }
    }

    fn to_patch(&self) -> StudentPatch {
        StudentPatch {
            name: self.name.clone(),
            email: non_empty(&self.email),
            phone: non_empty(&self.phone),
            course: self.course.clone(),
            year: self.year,
            attendance: self.attendance,
            grade: self.grade,
        }
    }
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Form/list/report workflow over one store.
pub struct Shell<R: StudentRepository> {
    service: StudentService<R>,
    records: Vec<Student>,
    form: StudentForm,
    selected: Option<StudentId>,
    pending_delete: Option<StudentId>,
}

impl<R: StudentRepository> Shell<R> {
    /// Creates a shell and loads the initial list view.
    pub fn new(service: StudentService<R>) -> ShellResult<Self> {
        let records = service.list_students(&StudentListQuery::default())?;
        Ok(Self {
            service,
            records,
            form: StudentForm::default(),
            selected: None,
            pending_delete: None,
        })
    }

    /// The cached list view, refreshed after every successful mutation.
    pub fn records(&self) -> &[Student] {
        &self.records
    }

    pub fn form(&self) -> &StudentForm {
        &self.form
    }

    /// Mutable form access for field-by-field editing.
    pub fn form_mut(&mut self) -> &mut StudentForm {
        &mut self.form
    }

    /// Id of the record currently loaded into the form, if any.
    pub fn selection(&self) -> Option<StudentId> {
        self.selected
    }

    /// Id armed for deletion, awaiting confirmation.
    pub fn pending_delete(&self) -> Option<StudentId> {
        self.pending_delete
    }

    /// Reloads the full list view from the store.
    pub fn refresh(&mut self) -> ShellResult<()> {
        self.records = self.service.list_students(&StudentListQuery::default())?;
        Ok(())
    }

    /// Loads one record into the form for editing.
    ///
    /// A stale id (deleted behind our back) surfaces `NotFound` and drops
    /// back to browsing.
    pub fn select(&mut self, id: StudentId) -> ShellResult<()> {
        match self.service.get_student(id)? {
            Some(student) => {
                self.form = StudentForm::from_student(&student);
                self.selected = Some(id);
                Ok(())
            }
            None => {
                self.selected = None;
                Err(RepoError::NotFound(id).into())
            }
        }
    }

    /// Submits the form as a new record.
    ///
    /// On success the form is cleared and the list refreshed; on any
    /// failure (validation, duplicate roll number) the form is retained.
    pub fn submit_add(&mut self) -> ShellResult<StudentId> {
        let draft = self.form.to_new_student();
        draft.validate().map_err(RepoError::from)?;

        let id = self.service.add_student(&draft).map_err(|err| {
            warn!(
                "event=student_add module=shell status=error roll_number={} error={}",
                draft.roll_number, err
            );
            ShellError::from(err)
        })?;

        info!("event=student_add module=shell status=ok id={id}");
        self.form = StudentForm::default();
        self.selected = None;
        self.refresh()?;
        Ok(id)
    }

    /// Submits the form as a full update of the selected record.
    ///
    /// A stale selection surfaces `NotFound` and returns the shell to
    /// browsing.
    pub fn submit_update(&mut self) -> ShellResult<StudentId> {
        let id = self.selected.ok_or(ShellError::NoSelection)?;
        let patch = self.form.to_patch();
        patch.validate().map_err(RepoError::from)?;

        match self.service.update_student(id, &patch) {
            Ok(()) => {
                info!("event=student_update module=shell status=ok id={id}");
                self.refresh()?;
                Ok(id)
            }
            Err(RepoError::NotFound(missing)) => {
                warn!("event=student_update module=shell status=stale id={missing}");
                self.selected = None;
                self.refresh()?;
                Err(RepoError::NotFound(missing).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Arms deletion of the selected record; nothing is removed yet.
    pub fn request_delete(&mut self) -> ShellResult<StudentId> {
        let id = self.selected.ok_or(ShellError::NoSelection)?;
        self.pending_delete = Some(id);
        Ok(id)
    }

    /// Disarms a pending deletion.
    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Executes the armed deletion.
    ///
    /// Clears the form if it held the deleted record. A stale id surfaces
    /// `NotFound` and returns the shell to browsing.
    pub fn confirm_delete(&mut self) -> ShellResult<StudentId> {
        let id = self.pending_delete.take().ok_or(ShellError::NoPendingDelete)?;

        match self.service.delete_student(id) {
            Ok(()) => {
                info!("event=student_delete module=shell status=ok id={id}");
                if self.selected == Some(id) {
                    self.form = StudentForm::default();
                    self.selected = None;
                }
                self.refresh()?;
                Ok(id)
            }
            Err(RepoError::NotFound(missing)) => {
                warn!("event=student_delete module=shell status=stale id={missing}");
                self.selected = None;
                self.refresh()?;
                Err(RepoError::NotFound(missing).into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resets the form and selection without touching the store.
    pub fn clear(&mut self) {
        self.form = StudentForm::default();
        self.selected = None;
        self.pending_delete = None;
    }

    /// Recomputes the aggregate report; independent of the editing state.
    pub fn aggregate(&self) -> ShellResult<AggregateReport> {
        self.service.aggregate().map_err(Into::into)
    }

    /// Exports the full record set as CSV; returns the row count.
    pub fn export_csv(&self, path: impl AsRef<Path>) -> Result<usize, ExportError> {
        export_csv(self.service.repo(), path)
    }

    /// Exports the rendered aggregate report as plain text.
    pub fn export_report(&self, path: impl AsRef<Path>) -> Result<(), ExportError> {
        export_report(self.service.repo(), path)
    }
}
