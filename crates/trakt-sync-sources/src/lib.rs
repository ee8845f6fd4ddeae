pub mod error;
pub mod traits;
pub mod trakt;

pub use error::SourceError;
pub use traits::TrackingClient;
pub use trakt::TraktClient;
