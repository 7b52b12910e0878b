pub mod structured_logging;
pub mod text;

pub use structured_logging::{
    init_logging, ExecutionContext, LoggingConfig, OperationTimer, StructuredLogEntry,
};
pub use text::{excerpt, preview, shorten};
