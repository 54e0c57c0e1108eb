/// Practice module
///
/// A practice session is a short quiz on one knowledge point. The session
/// itself is a plain state machine; the driver wires it to the backend, the
/// practice chat and the auto-advance timer.

pub mod driver;
pub mod messages;
pub mod session;

// Re-export main types
pub use driver::{PracticeDriver, PracticeEvent};
pub use session::{Phase, PracticeSession, SubmitOutcome};

use std::collections::BTreeMap;

use crate::api::models::QuestionRecord;

/// Option letters a question may carry, in display order
pub const OPTION_LETTERS: [char; 5] = ['A', 'B', 'C', 'D', 'E'];

/// A multiple-choice question as the session sees it
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub title: String,
    pub text: String,
    /// Present options only, keyed by upper-case letter
    pub options: BTreeMap<char, String>,
    /// Correct letter; `None` when the record carried no usable answer
    pub answer: Option<char>,
    pub difficulty: Option<String>,
    pub difficulty_level: Option<u32>,
    pub relevance_score: Option<f64>,
    pub expected_match: Option<String>,
    record: QuestionRecord,
}

impl Question {
    pub fn option(&self, letter: char) -> Option<&str> {
        self.options.get(&letter.to_ascii_uppercase()).map(String::as_str)
    }

    pub fn has_option(&self, letter: char) -> bool {
        self.options.contains_key(&letter.to_ascii_uppercase())
    }

    pub fn is_correct(&self, letter: char) -> bool {
        self.answer == Some(letter.to_ascii_uppercase())
    }

    /// "Level 2 (Medium)", or just the difficulty name
    pub fn difficulty_label(&self) -> String {
        let difficulty = self.difficulty.as_deref().unwrap_or("Unknown");
        match self.difficulty_level {
            Some(level) if level > 0 => format!("Level {} ({})", level, difficulty),
            _ => difficulty.to_string(),
        }
    }

    /// "87% relevant", or the backend's match label
    pub fn relevance_label(&self) -> String {
        match self.relevance_score {
            Some(score) if score != 0.0 && score.is_finite() => format!("{}% relevant", score.round()),
            _ => self.expected_match.clone().unwrap_or_else(|| "Unknown".to_string()),
        }
    }

    /// The record as the backend sent it, for the practice chat context
    pub fn record(&self) -> &QuestionRecord {
        &self.record
    }
}

impl From<QuestionRecord> for Question {
    fn from(record: QuestionRecord) -> Self {
        let slots = [
            &record.option_a,
            &record.option_b,
            &record.option_c,
            &record.option_d,
            &record.option_e,
        ];
        let options = OPTION_LETTERS
            .iter()
            .zip(slots)
            .filter_map(|(letter, text)| {
                text.as_ref()
                    .filter(|t| !t.trim().is_empty())
                    .map(|t| (*letter, t.clone()))
            })
            .collect();

        let answer = record
            .answer
            .as_deref()
            .map(str::trim)
            .and_then(|a| a.chars().next())
            .map(|c| c.to_ascii_uppercase())
            .filter(|c| OPTION_LETTERS.contains(c));

        Self {
            title: record.title.clone().filter(|t| !t.is_empty()).unwrap_or_else(|| "Question".to_string()),
            text: record.question_text.clone().unwrap_or_default(),
            options,
            answer,
            difficulty: record.difficulty.clone().filter(|d| !d.is_empty()),
            difficulty_level: record.difficulty_level,
            relevance_score: record.relevance_score,
            expected_match: record.expected_match.clone().filter(|m| !m.is_empty()),
            record,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> QuestionRecord {
        QuestionRecord {
            title: Some("Power rule".to_string()),
            question_text: Some("d/dx x^2 = ?".to_string()),
            option_a: Some("x".to_string()),
            option_b: Some("2x".to_string()),
            option_d: Some("x^2".to_string()),
            answer: Some("b".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_options_skip_missing_letters() {
        let question = Question::from(record());
        assert_eq!(question.options.keys().copied().collect::<Vec<_>>(), vec!['A', 'B', 'D']);
        assert!(!question.has_option('C'));
        assert_eq!(question.option('d'), Some("x^2"));
        assert_eq!(question.answer, Some('B'));
        assert!(question.is_correct('b'));
    }

    #[test]
    fn test_display_labels() {
        let mut question = Question::from(record());
        assert_eq!(question.difficulty_label(), "Unknown");
        assert_eq!(question.relevance_label(), "Unknown");

        question.difficulty = Some("Medium".to_string());
        question.difficulty_level = Some(2);
        question.relevance_score = Some(86.6);
        assert_eq!(question.difficulty_label(), "Level 2 (Medium)");
        assert_eq!(question.relevance_label(), "87% relevant");

        question.relevance_score = None;
        question.expected_match = Some("strong".to_string());
        assert_eq!(question.relevance_label(), "strong");
    }
}
