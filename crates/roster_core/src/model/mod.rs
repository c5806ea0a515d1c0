//! Domain model for the student roster.
//!
//! # Responsibility
//! - Define the canonical persisted record and the typed write models.
//! - Keep field-level validation close to the data it guards.
//!
//! # Invariants
//! - Every record is identified by a stable store-assigned `StudentId`.
//! - `roll_number` is immutable after creation; updates go through
//!   `StudentPatch`, which cannot carry it.

pub mod student;
