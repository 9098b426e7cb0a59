// Infrastructure layer modules
pub mod config;
pub mod logging;
pub mod object_store;
pub mod search_platform;
pub mod splunk;

// Re-exports
pub use config::{AwsConfig, ConfigError, ExportConfig, QueryConfig, SplunkConfig};
pub use logging::{file_dispatch, LoggingError};
pub use object_store::{ObjectStore, ObjectStoreError, S3ObjectStore};
pub use search_platform::{SearchJob, SearchPlatform, SearchPlatformError};
pub use splunk::{ResultsReader, SplunkClient};
