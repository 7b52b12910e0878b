//! Flesch Reading Ease scoring.
//!
//! `206.835 - 1.015 * (words / sentences) - 84.6 * (syllables / words)`
//!
//! Higher is easier: above 60 reads comfortably for a general audience, below
//! 30 is dense. The score is not clamped and can go negative for very long
//! sentences or exceed 100 for very short words.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Score returned for text without any words.
pub const EMPTY_TEXT_SCORE: f64 = 206.835;

/// Shown in place of a score for text with no words.
pub const NO_SCORE_LABEL: &str = "n/a (no readable text)";

const SENTENCE_WEIGHT: f64 = 1.015;
const SYLLABLE_WEIGHT: f64 = 84.6;

/// Sentences this short are not counted as sentences.
const MIN_SENTENCE_WORDS: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextStats {
    pub words: usize,
    pub sentences: usize,
    pub syllables: usize,
}

impl TextStats {
    pub fn analyze(text: &str) -> Self {
        let mut words = 0;
        let mut syllables = 0;
        for word in words_of(text) {
            words += 1;
            syllables += count_syllables(&word);
        }

        let counted_sentences = text
            .split(&['.', '!', '?'][..])
            .filter(|sentence| words_of(sentence).count() >= MIN_SENTENCE_WORDS)
            .count();

        Self {
            words,
            sentences: counted_sentences.max(1),
            syllables,
        }
    }
}

/// Flesch Reading Ease, rounded to two decimals. Total over all inputs.
pub fn flesch_reading_ease(text: &str) -> f64 {
    let stats = TextStats::analyze(text);
    if stats.words == 0 {
        return EMPTY_TEXT_SCORE;
    }

    let words = stats.words as f64;
    let per_sentence = words / stats.sentences as f64;
    let per_word = stats.syllables as f64 / words;
    let score = EMPTY_TEXT_SCORE - SENTENCE_WEIGHT * per_sentence - SYLLABLE_WEIGHT * per_word;

    (score * 100.0).round() / 100.0
}

fn words_of(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(|token| {
            token
                .chars()
                .filter(|c| *c == '\'' || !c.is_ascii_punctuation())
                .collect::<String>()
        })
        .filter(|word| word.chars().any(char::is_alphanumeric))
}

fn count_syllables(word: &str) -> usize {
    let letters: Vec<char> = word
        .chars()
        .filter(|c| c.is_alphabetic())
        .flat_map(char::to_lowercase)
        .collect();

    let is_vowel = |c: char| matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y');

    let mut groups = 0;
    let mut previous_vowel = false;
    for &c in &letters {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            groups += 1;
        }
        previous_vowel = vowel;
    }

    // silent trailing e, except "-le" endings like "table"
    let n = letters.len();
    if groups > 1 && n >= 2 && letters[n - 1] == 'e' && letters[n - 2] != 'l' {
        groups -= 1;
    }

    groups.max(1)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreBand {
    Easy,
    Moderate,
    Difficult,
}

impl ScoreBand {
    pub fn for_score(score: f64) -> Self {
        if score > 60.0 {
            ScoreBand::Easy
        } else if score > 30.0 {
            ScoreBand::Moderate
        } else {
            ScoreBand::Difficult
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreBand::Easy => "Easy to read",
            ScoreBand::Moderate => "Moderately difficult",
            ScoreBand::Difficult => "Difficult to read",
        }
    }
}

impl fmt::Display for ScoreBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReadabilityScore {
    pub value: f64,
}

impl ReadabilityScore {
    pub fn band(&self) -> ScoreBand {
        ScoreBand::for_score(self.value)
    }

    /// False for the placeholder score produced by word-less text.
    pub fn is_meaningful(&self) -> bool {
        self.value.is_finite() && self.value != EMPTY_TEXT_SCORE
    }
}

impl fmt::Display for ReadabilityScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.is_meaningful() {
            return f.write_str(NO_SCORE_LABEL);
        }
        write!(f, "{:.1} ({})", self.value, self.band())
    }
}
