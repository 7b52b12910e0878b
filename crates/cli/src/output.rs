use analyzer::{split_sections, AnalysisReport, CritiqueCategory, ReadabilityScore, ReportFormat, ScoreBand};
use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};

/// Where `--output` should land: a directory gets the default file name.
pub fn resolve_output_path(output: &Path, report: &AnalysisReport, format: ReportFormat) -> PathBuf {
    if output.is_dir() {
        output.join(report.default_file_name(format))
    } else {
        output.to_path_buf()
    }
}

/// Print the report, or write it when `output` is given.
pub fn emit_report(report: &AnalysisReport, format: ReportFormat, output: Option<&Path>) -> Result<()> {
    if let Some(output) = output {
        let path = resolve_output_path(output, report, format);
        let rendered = report.render(format).context("Failed to render report")?;
        std::fs::write(&path, rendered)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;

        println!("{} Report saved to {}", style("✓").green(), style(path.display()).bold());
        return Ok(());
    }

    match format {
        ReportFormat::Text => print_text_report(report),
        other => {
            let rendered = report.render(other).context("Failed to render report")?;
            println!("{}", rendered);
        }
    }
    Ok(())
}

fn print_text_report(report: &AnalysisReport) {
    println!();
    println!("{}", style("Analysis Results").cyan().bold());
    println!("{} {}", style("URL:").bold(), report.url);
    println!("{}", style(format!("Session ID: {}", report.session_id)).dim());

    for category in CritiqueCategory::ALL {
        println!();
        println!("{}", style(format!("━━ {} ━━", category.title())).bold());

        if category == CritiqueCategory::Readability {
            if let Some(score) = report.score() {
                print_score(score);
            }
        }

        let text = report.critique(category);
        match split_sections(text) {
            Some(sections) => {
                for (title, body) in sections {
                    println!();
                    println!("{}", style(title).yellow().bold());
                    println!("{}", body);
                }
            }
            None => println!("{}", text.trim_end()),
        }
    }

    if !report.degraded.is_empty() {
        let names: Vec<_> = report.degraded.iter().map(|c| c.key()).collect();
        println!();
        println!(
            "{} Some critiques could not be generated: {}",
            style("⚠").yellow().bold(),
            names.join(", ")
        );
    }
}

fn score_line(score: ReadabilityScore) -> String {
    format!("Flesch Reading Ease: {}", score)
}

fn print_score(score: ReadabilityScore) {
    let line = score_line(score);
    if !score.is_meaningful() {
        println!("{}", style(line).dim());
        return;
    }
    let styled = match score.band() {
        ScoreBand::Easy => style(line).green(),
        ScoreBand::Moderate => style(line).yellow(),
        ScoreBand::Difficult => style(line).red(),
    };
    println!("{}", styled.bold());
}

#[cfg(test)]
mod tests {
    use super::*;
    use analyzer::flesch_reading_ease;
    use tempfile::TempDir;

    fn report() -> AnalysisReport {
        AnalysisReport {
            session_id: "abcdef0123456789".to_string(),
            url: "https://docs.example.com/a".to_string(),
            readability_score: Some(62.0),
            readability: "## Assessment\nOK".to_string(),
            structure: "## Assessment\nOK".to_string(),
            completeness: "## Assessment\nOK".to_string(),
            style: "## Assessment\nOK".to_string(),
            degraded: Vec::new(),
        }
    }

    #[test]
    fn test_directory_output_uses_default_name() {
        let dir = TempDir::new().expect("tempdir");
        let path = resolve_output_path(dir.path(), &report(), ReportFormat::Json);
        assert_eq!(path, dir.path().join("doc_analysis_abcdef01.json"));

        let explicit = dir.path().join("custom.md");
        assert_eq!(resolve_output_path(&explicit, &report(), ReportFormat::Markdown), explicit);
    }

    #[test]
    fn test_score_line_for_wordless_page() {
        let empty = ReadabilityScore {
            value: flesch_reading_ease(""),
        };
        assert_eq!(score_line(empty), "Flesch Reading Ease: n/a (no readable text)");
        assert_eq!(
            score_line(ReadabilityScore { value: 62.0 }),
            "Flesch Reading Ease: 62.0 (Easy to read)"
        );
    }

    #[test]
    fn test_emit_writes_markdown_for_text_format() {
        let dir = TempDir::new().expect("tempdir");
        emit_report(&report(), ReportFormat::Text, Some(dir.path())).expect("emit");

        let written = std::fs::read_to_string(dir.path().join("doc_analysis_abcdef01.md"))
            .expect("report file");
        assert!(written.starts_with("# Documentation Analysis Report"));
    }
}
