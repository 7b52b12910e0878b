//! Documentation quality analysis: Flesch scoring, model-written critiques,
//! and the pipeline that ties fetching, critique and storage together.

pub mod context;
pub mod critic;
pub mod pipeline;
pub mod prompts;
pub mod readability;
pub mod report;

pub use context::AppContext;
pub use critic::{Critique, CritiqueOutcome, CritiqueSet, NarrativeCritic};
pub use pipeline::{AnalyzeError, DocumentAnalyzer};
pub use prompts::CritiqueCategory;
pub use readability::{
    flesch_reading_ease, ReadabilityScore, ScoreBand, EMPTY_TEXT_SCORE, NO_SCORE_LABEL,
};
pub use report::{split_sections, AnalysisReport, AnalysisResults, ReportFormat};
