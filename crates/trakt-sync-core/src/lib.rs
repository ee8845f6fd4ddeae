pub mod cache;
pub mod diff;
pub mod error;
pub mod library;
pub mod matching;
pub mod metadata;
pub mod records;
pub mod runner;
pub mod store;
pub mod sync;

pub use cache::{CacheSnapshot, TraktCache};
pub use error::{CacheError, LibraryError, StoreError};
pub use library::{JsonLibrary, LibrarySnapshot, MediaLibrary};
pub use runner::{SyncOutcome, SyncRunner, SyncSelection, SyncStart};
pub use store::{FileStore, InMemoryStore, PersistentStore};
pub use sync::{SyncOrchestrator, SyncStatistics};
