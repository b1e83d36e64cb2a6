//! Application layer for modelpick.
//!
//! Coordinates the domain and infrastructure layers into the model selection
//! use case.

pub mod model_selection_service;

pub use model_selection_service::{ModelSelectionService, PreparedList};
