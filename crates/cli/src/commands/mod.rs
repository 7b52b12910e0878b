pub mod analyze;
pub mod sessions;
pub mod status;

pub use analyze::AnalyzeCommand;
pub use sessions::ShowCommand;

use analyzer::ReportFormat;
use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum FormatArg {
    /// Styled terminal output
    #[default]
    Text,
    Markdown,
    Json,
}

impl From<FormatArg> for ReportFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Text => ReportFormat::Text,
            FormatArg::Markdown => ReportFormat::Markdown,
            FormatArg::Json => ReportFormat::Json,
        }
    }
}
