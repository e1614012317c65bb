pub mod loader;
pub mod schema;

pub use loader::{load_from_path, load_from_str, resolve, ConfigError};
pub use schema::{
    GeneratorConfig, RunnerConfig, ScanConfig, ValidationError, ValidationIssue, CONFIG_FILE_NAME,
};
