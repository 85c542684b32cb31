pub mod cmdb;
pub mod error;
pub mod http;
pub mod omdb;
pub mod traits;

pub use cmdb::CmdbClient;
pub use error::SourceError;
pub use omdb::OmdbClient;
pub use traits::{MetadataBackend, RatingsBackend};
