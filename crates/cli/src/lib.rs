//! docimprove command-line front end.

pub mod commands;
pub mod output;
pub mod progress;

pub use commands::{AnalyzeCommand, FormatArg, ShowCommand};
