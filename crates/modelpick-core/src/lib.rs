//! Domain layer for modelpick.
//!
//! Provider catalogs, configuration snapshots, recent-model validation,
//! option list building and document reconciliation. Nothing in this crate
//! performs I/O; persistence is reached through [`repository::DerivedConfigRepository`].

pub mod catalog;
pub mod error;
pub mod option;
pub mod option_list;
pub mod recency;
pub mod reconcile;
pub mod repository;
pub mod snapshot;

// Re-export common types
pub use catalog::{ModelDescriptor, ProviderCatalog, ProviderDescriptor};
pub use error::{ModelPickError, Result};
pub use option::{ModelOption, RECENT_ID_PREFIX, model_key};
pub use option_list::{ItemOrigin, ModelList, OptionGroup, OptionItem, OptionListBuilder};
pub use recency::{MAX_RECENT_MODELS, validate_recents};
pub use repository::DerivedConfigRepository;
pub use snapshot::{ConfigSnapshot, RecentEntry, SizeClass};
