//! Student use-case service.
//!
//! # Responsibility
//! - Provide stable CRUD and report entry points for shells.
//! - Delegate persistence to repository implementations.
//!
//! # Invariants
//! - Service APIs never bypass repository validation/persistence
//!   contracts.
//! - The service layer remains storage-agnostic.

use crate::model::student::{NewStudent, Student, StudentId, StudentPatch};
use crate::repo::student_repo::{RepoResult, StudentListQuery, StudentRepository};
use crate::report::AggregateReport;

/// Use-case service wrapper for student record operations.
pub struct StudentService<R: StudentRepository> {
    repo: R,
}

impl<R: StudentRepository> StudentService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Borrows the underlying repository, e.g. for export side-actions.
    pub fn repo(&self) -> &R {
        &self.repo
    }

    /// Creates a new record and returns its store-assigned id.
    pub fn add_student(&self, student: &NewStudent) -> RepoResult<StudentId> {
        self.repo.create(student)
    }

    /// Lists records matching the query in insertion order.
    pub fn list_students(&self, query: &StudentListQuery) -> RepoResult<Vec<Student>> {
        self.repo.list(query)
    }

    /// Gets one record by id.
    pub fn get_student(&self, id: StudentId) -> RepoResult<Option<Student>> {
        self.repo.get(id)
    }

    /// Replaces all mutable fields of one record.
    ///
    /// Returns repository-level not-found or validation errors unchanged.
    pub fn update_student(&self, id: StudentId, patch: &StudentPatch) -> RepoResult<()> {
        self.repo.update(id, patch)
    }

    /// Deletes one record by id.
    pub fn delete_student(&self, id: StudentId) -> RepoResult<()> {
        self.repo.delete(id)
    }

    /// Recomputes the aggregate report on demand.
    pub fn aggregate(&self) -> RepoResult<AggregateReport> {
        self.repo.aggregate()
    }
}
