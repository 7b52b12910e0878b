pub mod loader;
pub mod model;
pub mod validator;

pub use loader::{ConfigLoader, ConfigSource};
pub use model::{
    AnalysisConfig, AppConfig, FetchConfig, LlmConfig, LoggingSettings, StorageConfig,
};
pub use validator::ConfigValidator;
