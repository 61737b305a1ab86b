pub mod loader;
pub mod schema;

pub use loader::{
    default_config_path, load_config, load_config_from_str, load_config_from_yaml_str,
    resolve_api_key,
};
pub use schema::{CollectorConfig, DashboardConfig, LoggingConfig, RetryConfig};
