use crate::critic::CritiqueSet;
use crate::prompts::CritiqueCategory;
use crate::readability::ReadabilityScore;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::Write as _;
use storage::SessionRecord;

/// Everything one analysis run produced, before persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResults {
    pub readability_score: f64,
    pub critiques: CritiqueSet,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportFormat {
    #[default]
    Text,
    Markdown,
    Json,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Text | ReportFormat::Markdown => "md",
            ReportFormat::Json => "json",
        }
    }
}

/// A renderable view of a session, fresh or reloaded from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub session_id: String,
    pub url: String,
    pub readability_score: Option<f64>,
    pub readability: String,
    pub structure: String,
    pub completeness: String,
    pub style: String,
    /// Categories whose text is a failure message. Unknown for reloaded sessions.
    #[serde(default)]
    pub degraded: Vec<CritiqueCategory>,
}

impl AnalysisReport {
    pub fn from_results(session_id: &str, url: &str, results: &AnalysisResults) -> Self {
        let critiques = &results.critiques;
        Self {
            session_id: session_id.to_string(),
            url: url.to_string(),
            readability_score: Some(results.readability_score),
            readability: critiques.readability.text.clone(),
            structure: critiques.structure.text.clone(),
            completeness: critiques.completeness.text.clone(),
            style: critiques.style.text.clone(),
            degraded: critiques.degraded(),
        }
    }

    pub fn from_record(record: SessionRecord, readability_score: Option<f64>) -> Self {
        Self {
            session_id: record.session_id,
            url: record.url,
            readability_score,
            readability: record.readability,
            structure: record.structure,
            completeness: record.completeness,
            style: record.style,
            degraded: Vec::new(),
        }
    }

    pub fn critique(&self, category: CritiqueCategory) -> &str {
        match category {
            CritiqueCategory::Readability => &self.readability,
            CritiqueCategory::Structure => &self.structure,
            CritiqueCategory::Completeness => &self.completeness,
            CritiqueCategory::Style => &self.style,
        }
    }

    pub fn short_id(&self) -> &str {
        short_id(&self.session_id)
    }

    /// `doc_analysis_<first 8 chars of id>.<ext>`
    pub fn default_file_name(&self, format: ReportFormat) -> String {
        format!("doc_analysis_{}.{}", self.short_id(), format.extension())
    }

    pub fn score(&self) -> Option<ReadabilityScore> {
        self.readability_score.map(|value| ReadabilityScore { value })
    }

    /// File form of the report. Text has no file form of its own and is
    /// written as markdown; the terminal layout lives with the binary.
    pub fn render(&self, format: ReportFormat) -> Result<String, serde_json::Error> {
        match format {
            ReportFormat::Text | ReportFormat::Markdown => Ok(self.render_markdown()),
            ReportFormat::Json => self.render_json(),
        }
    }

    pub fn render_markdown(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "# Documentation Analysis Report\n");
        let _ = writeln!(out, "## Article: [{url}]({url})\n", url = self.url);

        if let Some(score) = self.score() {
            let _ = writeln!(out, "**Flesch Reading Ease:** {}\n", score);
        }

        for category in CritiqueCategory::ALL {
            let _ = writeln!(out, "### {}\n", category.title());
            let _ = writeln!(out, "{}\n", self.critique(category).trim_end());
        }

        out
    }

    pub fn render_json(&self) -> Result<String, serde_json::Error> {
        let mut analysis = Map::new();
        for category in CritiqueCategory::ALL {
            analysis.insert(
                category.key().to_string(),
                Value::String(self.critique(category).to_string()),
            );
        }

        let mut report = json!({
            "url": self.url,
            "session_id": self.session_id,
        });
        if let (Some(score), Some(obj)) = (self.score(), report.as_object_mut()) {
            obj.insert("readability_score".to_string(), json!(score.value));
            obj.insert("score_meaningful".to_string(), json!(score.is_meaningful()));
        }
        if let Some(obj) = report.as_object_mut() {
            obj.insert("analysis".to_string(), Value::Object(analysis));
        }

        serde_json::to_string_pretty(&report)
    }
}

pub fn short_id(session_id: &str) -> &str {
    common::excerpt(session_id, 8)
}

/// Split model output into `(title, body)` pairs on `##` headings.
///
/// Returns `None` when the text has no `Assessment` heading, in which case it
/// should be shown as is. Pieces with an empty title or body are dropped.
pub fn split_sections(text: &str) -> Option<Vec<(String, String)>> {
    if !text.contains("## Assessment") {
        return None;
    }

    let sections = text
        .split("##")
        .filter(|piece| !piece.trim().is_empty())
        .filter_map(|piece| {
            let (title, body) = piece.split_once('\n').unwrap_or((piece, ""));
            let title = title.trim_matches(|c: char| c == '#' || c.is_whitespace());
            let body = body.trim();
            if title.is_empty() || body.is_empty() {
                None
            } else {
                Some((title.to_string(), body.to_string()))
            }
        })
        .collect();

    Some(sections)
}
