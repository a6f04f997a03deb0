//! Exclusive-association management over composite-key relations.
//!
//! An [`AssociationManager`] validates references, rejects duplicate keys and
//! keeps at most one exclusive row per owner, running each write in one store
//! transaction. Stores implement [`AssociationStore`], [`ReferenceLookup`] and
//! [`Transactional`]; [`MemoryStore`] is the in-process implementation.

pub mod error;
pub mod exclusivity;
pub mod manager;
pub mod memory;
pub mod store;

pub use error::{AssociationError, AssociationResult, StoreError, StoreResult};
pub use exclusivity::current_exclusive;
pub use manager::AssociationManager;
pub use memory::MemoryStore;
pub use store::{AssociationStore, Key, ReferenceLookup, Transactional};

pub mod types {
    pub use gastro_review_database_types::*;
}
