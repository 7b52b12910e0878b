use super::FormatArg;
use crate::output::emit_report;
use crate::progress::ProgressType;
use analyzer::AppContext;
use anyhow::{bail, Result};
use clap::Args;
use colored::*;
use common::shorten;
use prettytable::{row, Table};
use std::path::PathBuf;

const URL_DISPLAY_CHARS: usize = 30;

/// Most recent sessions, newest first.
pub async fn recent(ctx: &AppContext, limit: Option<usize>) -> Result<()> {
    let limit = limit.unwrap_or(ctx.config.analysis.recent_limit);
    let sessions = ctx.store.recent_sessions(limit).await?;

    if sessions.is_empty() {
        println!("{}", "No analysis history yet".yellow());
        return Ok(());
    }

    println!("{}", "Recent Sessions".bold());
    for session in sessions {
        println!(
            "  {}  {}",
            session.session_id.cyan(),
            shorten(&session.url, URL_DISPLAY_CHARS)
        );
    }
    Ok(())
}

/// Every stored session as a table.
pub async fn history(ctx: &AppContext) -> Result<()> {
    let sessions = ctx.store.all_sessions().await?;

    if sessions.is_empty() {
        println!("{}", "No analysis history found".yellow());
        return Ok(());
    }

    println!("{}", "Analysis History".bold());
    let mut table = Table::new();
    table.add_row(row!["#", "Session ID", "URL"]);
    for session in &sessions {
        table.add_row(row![
            session.seq,
            session.record.session_id,
            session.record.url
        ]);
    }
    table.printstd();

    println!(
        "{} {} session(s). Use {} to view one.",
        "ℹ".blue(),
        sessions.len(),
        "docimprove show <SESSION_ID>".bold()
    );
    Ok(())
}

#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Full session id
    pub session_id: String,

    #[arg(long, value_enum, default_value_t = FormatArg::Text)]
    pub format: FormatArg,

    /// Write the report to this file or directory
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl ShowCommand {
    pub async fn execute(self, ctx: &AppContext) -> Result<()> {
        let spinner = ProgressType::Storage.create_spinner("Loading session...");
        let loaded = ctx.analyzer.load_session(&self.session_id).await?;
        spinner.finish_and_clear();

        let Some(report) = loaded else {
            bail!("No session found with id {}", self.session_id);
        };

        emit_report(&report, self.format.into(), self.output.as_deref())
    }
}
