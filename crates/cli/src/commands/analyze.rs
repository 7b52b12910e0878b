use super::FormatArg;
use crate::output::emit_report;
use crate::progress::ProgressType;
use analyzer::AppContext;
use anyhow::Result;
use clap::Args;
use common::preview;
use console::style;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct AnalyzeCommand {
    /// Documentation article URL
    pub url: String,

    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    /// Write the report to this file or directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Skip the extracted content preview (always skipped for JSON)
    #[arg(long)]
    pub no_preview: bool,
}

impl AnalyzeCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let analyzer = &ctx.analyzer;

        let spinner = ProgressType::Fetch.create_spinner("Extracting article content...");
        let fetched = match analyzer.fetch(&self.url).await {
            Ok(fetched) => {
                let chars = fetched.content.chars().count();
                spinner.finish_success(Some(format!("✓ Extracted {} characters", chars).as_str()));
                fetched
            }
            Err(e) => {
                spinner.finish_error("Extraction failed");
                return Err(e.into());
            }
        };

        // JSON on stdout must stay parseable
        let show_preview = !self.no_preview && self.format != FormatArg::Json;
        if show_preview {
            println!();
            if !fetched.title.is_empty() {
                println!("{} {}", style("Title:").bold(), fetched.title);
            }
            println!("{}", style("Extracted Content Preview").cyan().bold());
            println!(
                "{}",
                preview(&fetched.content, ctx.config.analysis.preview_chars)
            );
            println!();
        }

        let spinner = ProgressType::Analyze.create_spinner("Analyzing document...");
        let report = match analyzer.analyze_text(&self.url, &fetched.content).await {
            Ok(report) => {
                spinner.finish_success(None);
                report
            }
            Err(e) => {
                spinner.finish_error("Analysis failed");
                return Err(e.into());
            }
        };

        emit_report(&report, self.format.into(), self.output.as_deref())
    }
}
