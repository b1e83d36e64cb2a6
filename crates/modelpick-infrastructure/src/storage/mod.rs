//! Storage layer for atomic, locked document operations.

mod document_storage;

pub use document_storage::{DocumentFormat, DocumentStorage, DocumentStorageError};
