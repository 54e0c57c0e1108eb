use tracing::{debug, info};

use super::{messages, Question};
use crate::api::models::QuestionRecord;
use crate::error::{Result, TutorError};

/// Where a practice session stands
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Loading,
    QuestionActive,
    /// The backend matched no questions to the knowledge point
    NoQuestions,
    /// Fetch failed; a retry re-enters `Loading`
    LoadError(String),
    Complete,
}

/// Result of evaluating the selected option
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Correct,
    Wrong { attempts_left: u32 },
    /// Wrong again past the threshold; a hint should be requested
    HintRequested { wrong_attempts: u32 },
}

/// Quiz state for one knowledge point
///
/// Pure state: nothing here talks to the backend or sleeps. The wrong-answer
/// counter is scoped to the current question and only resets when the
/// question changes, so every wrong submission at or past the threshold asks
/// for another hint. A correct answer locks the question until it changes.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    knowledge_point: String,
    questions: Vec<Question>,
    cursor: usize,
    selected: Option<char>,
    wrong_attempts: u32,
    max_wrong_attempts: u32,
    answered: bool,
    phase: Phase,
    /// Bumped whenever the current question changes
    generation: u64,
}

impl PracticeSession {
    pub fn new(knowledge_point: impl Into<String>, max_wrong_attempts: u32) -> Self {
        Self {
            knowledge_point: knowledge_point.into(),
            questions: Vec::new(),
            cursor: 0,
            selected: None,
            wrong_attempts: 0,
            max_wrong_attempts: max_wrong_attempts.max(1),
            answered: false,
            phase: Phase::Loading,
            generation: 0,
        }
    }

    pub fn knowledge_point(&self) -> &str {
        &self.knowledge_point
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn selected(&self) -> Option<char> {
        self.selected
    }

    pub fn wrong_attempts(&self) -> u32 {
        self.wrong_attempts
    }

    /// Whether the current question was answered correctly
    pub fn is_answered(&self) -> bool {
        self.answered
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    /// Question on screen, only while one is active
    pub fn current(&self) -> Option<&Question> {
        match self.phase {
            Phase::QuestionActive => self.questions.get(self.cursor),
            _ => None,
        }
    }

    pub fn begin_loading(&mut self) {
        self.phase = Phase::Loading;
    }

    /// Install fetched questions and show the first one
    pub fn load(&mut self, records: Vec<QuestionRecord>) -> &Phase {
        self.questions = records.into_iter().map(Question::from).collect();
        self.cursor = 0;
        self.reset_question();

        if self.questions.is_empty() {
            info!("No practice questions for '{}'", self.knowledge_point);
            self.phase = Phase::NoQuestions;
        } else {
            info!("📝 Loaded {} practice questions for '{}'", self.questions.len(), self.knowledge_point);
            self.phase = Phase::QuestionActive;
        }
        &self.phase
    }

    pub fn load_failed(&mut self, reason: impl Into<String>) {
        self.phase = Phase::LoadError(reason.into());
    }

    /// Select an option, replacing any earlier selection
    pub fn select(&mut self, letter: char) -> Result<()> {
        let question = self.current().ok_or(TutorError::NoActiveQuestion)?;
        if self.answered {
            return Err(TutorError::AlreadyAnswered);
        }
        let letter = letter.to_ascii_uppercase();
        if !question.has_option(letter) {
            return Err(TutorError::UnknownOption(letter));
        }
        self.selected = Some(letter);
        Ok(())
    }

    /// Evaluate the selected option against the current question
    pub fn submit(&mut self) -> Result<(char, SubmitOutcome)> {
        let question = self.current().ok_or(TutorError::NoActiveQuestion)?;
        if self.answered {
            return Err(TutorError::AlreadyAnswered);
        }
        let letter = self.selected.ok_or(TutorError::NoSelection)?;

        if question.is_correct(letter) {
            debug!("Answer {} is correct", letter);
            self.answered = true;
            return Ok((letter, SubmitOutcome::Correct));
        }

        self.wrong_attempts += 1;
        debug!("Answer {} is wrong ({} wrong so far)", letter, self.wrong_attempts);

        let outcome = if self.wrong_attempts < self.max_wrong_attempts {
            SubmitOutcome::Wrong {
                attempts_left: self.max_wrong_attempts - self.wrong_attempts,
            }
        } else {
            SubmitOutcome::HintRequested {
                wrong_attempts: self.wrong_attempts,
            }
        };
        Ok((letter, outcome))
    }

    /// Move to the next question, or finish after the last one
    pub fn advance(&mut self) -> Result<&Phase> {
        if self.phase != Phase::QuestionActive {
            return Err(TutorError::NoActiveQuestion);
        }

        self.cursor += 1;
        self.reset_question();
        if self.cursor >= self.questions.len() {
            info!("🎉 Practice on '{}' complete ({} questions)", self.knowledge_point, self.questions.len());
            self.phase = Phase::Complete;
        }
        Ok(&self.phase)
    }

    /// Leave the current question unanswered
    pub fn skip(&mut self) -> Result<&Phase> {
        debug!("Skipping question {}", self.cursor + 1);
        self.advance()
    }

    /// Closing summary; only meaningful once complete
    pub fn summary(&self) -> String {
        messages::summary(self.questions.len(), &self.knowledge_point)
    }

    fn reset_question(&mut self) {
        self.selected = None;
        self.wrong_attempts = 0;
        self.answered = false;
        self.generation += 1;
    }
}
