use serde::{Deserialize, Serialize};
use std::fmt;

/// The four critique dimensions, in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CritiqueCategory {
    Readability,
    Structure,
    Completeness,
    Style,
}

impl CritiqueCategory {
    pub const ALL: [CritiqueCategory; 4] = [
        CritiqueCategory::Readability,
        CritiqueCategory::Structure,
        CritiqueCategory::Completeness,
        CritiqueCategory::Style,
    ];

    /// Column / JSON key name.
    pub fn key(&self) -> &'static str {
        match self {
            CritiqueCategory::Readability => "readability",
            CritiqueCategory::Structure => "structure",
            CritiqueCategory::Completeness => "completeness",
            CritiqueCategory::Style => "style",
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            CritiqueCategory::Readability => "Readability for Marketers",
            CritiqueCategory::Structure => "Structure and Flow",
            CritiqueCategory::Completeness => "Completeness of Information",
            CritiqueCategory::Style => "Style Guide Adherence",
        }
    }

    /// Markdown sections the model is asked to produce.
    pub fn sections(&self) -> &'static [&'static str] {
        match self {
            CritiqueCategory::Readability => {
                &["Assessment", "Problem Areas", "Actionable Suggestions"]
            }
            CritiqueCategory::Structure => &[
                "Assessment",
                "Structural Elements",
                "Flow Issues",
                "Improvement Suggestions",
            ],
            CritiqueCategory::Completeness => &[
                "Assessment",
                "Information Gaps",
                "Example Quality",
                "Improvement Suggestions",
            ],
            CritiqueCategory::Style => &[
                "Assessment",
                "Voice and Tone",
                "Language Issues",
                "Improvement Suggestions",
            ],
        }
    }
}

impl fmt::Display for CritiqueCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

const READABILITY_TEMPLATE: &str = "\
Analyze the readability of this documentation article for a non-technical marketer:
1. The Flesch Reading Ease score is {score}.
2. Explain what this score means in the context of marketing documentation.
3. Identify 3-4 specific sentences or paragraphs that affect readability.
4. Provide specific, actionable suggestions to improve readability for marketers.

Format your response with these specific markdown sections:
## Assessment
[Your assessment of the readability and what the score means]

## Problem Areas
[List the specific sentences or paragraphs that affect readability]

## Actionable Suggestions
[List numbered, specific suggestions for improvement]

Article: {article}
";

const STRUCTURE_TEMPLATE: &str = "\
Analyze the structure and flow of this documentation article:
1. Evaluate the use of headings, subheadings, paragraph length, and lists.
2. Assess if information flows logically and is easy to navigate.
3. Identify 3-4 specific structural issues that could be improved.
4. Provide specific, actionable suggestions for better structure and flow.

Format your response with these specific markdown sections:
## Assessment
[Your assessment of the overall structure and flow]

## Structural Elements
[Analysis of headings, subheadings, paragraph length, lists, etc.]

## Flow Issues
[Specific issues with information flow and navigation]

## Improvement Suggestions
[Numbered, specific suggestions for improvement]

Article: {article}
";

const COMPLETENESS_TEMPLATE: &str = "\
Analyze the completeness of information and examples in this documentation article:
1. Assess if there's enough detail to understand and implement the feature or concept.
2. Evaluate the quality and quantity of examples provided.
3. Identify 3-4 specific areas where more information or examples are needed.
4. Provide specific, actionable suggestions for improving completeness.

Format your response with these specific markdown sections:
## Assessment
[Your assessment of the overall completeness]

## Information Gaps
[Specific areas where more information is needed]

## Example Quality
[Assessment of examples provided and what's missing]

## Improvement Suggestions
[Numbered, specific suggestions for adding information or examples]

Article: {article}
";

const STYLE_TEMPLATE: &str = "\
Analyze this article using Microsoft's Style Guide principles, focusing on:
1. Voice and Tone: Is it customer-focused, clear, and concise?
2. Clarity and Conciseness: Are there complex sentences or jargon that could be simplified?
3. Action-oriented language: Does it guide the user effectively?
4. Identify 3-4 specific style issues that should be addressed.
5. Provide specific, actionable suggestions for improving style adherence.

Format your response with these specific markdown sections:
## Assessment
[Your overall assessment of style guide adherence]

## Voice and Tone
[Analysis of customer focus, clarity, and conciseness]

## Language Issues
[Specific examples of complex sentences, jargon, or passive voice]

## Improvement Suggestions
[Numbered, specific suggestions for style improvements]

Article: {article}
";

fn template(category: CritiqueCategory) -> &'static str {
    match category {
        CritiqueCategory::Readability => READABILITY_TEMPLATE,
        CritiqueCategory::Structure => STRUCTURE_TEMPLATE,
        CritiqueCategory::Completeness => COMPLETENESS_TEMPLATE,
        CritiqueCategory::Style => STYLE_TEMPLATE,
    }
}

/// Fill a category template. `article` is inserted last so braces inside the
/// article text are never treated as placeholders.
pub fn render_prompt(category: CritiqueCategory, article: &str, score: f64) -> String {
    let (head, tail) = template(category)
        .split_once("{article}")
        .unwrap_or((template(category), ""));

    let mut prompt = head.replace("{score}", &score.to_string());
    prompt.push_str(article);
    prompt.push_str(tail);
    prompt
}
