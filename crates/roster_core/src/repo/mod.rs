//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts.
//! - Isolate SQLite query details from service/shell orchestration.
//!
//! # Invariants
//! - Repository writes must validate typed inputs before persistence.
//! - Repository APIs return semantic errors (`NotFound`,
//!   `DuplicateRollNumber`) in addition to DB transport errors.

pub mod student_repo;
