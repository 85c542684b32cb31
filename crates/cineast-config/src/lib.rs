pub mod config;
pub mod credentials;
pub mod flags;
pub mod paths;

pub use config::{ApiConfig, Config, DisplayConfig, FlagConfig, DEFAULT_CMDB_URL, DEFAULT_OMDB_URL};
pub use credentials::CredentialStore;
pub use flags::{FlagStore, ReviewedFlag};
pub use paths::{PathManager, container_base_path};
