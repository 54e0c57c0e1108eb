use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::session::{Phase, PracticeSession, SubmitOutcome};
use super::{messages, Question};
use crate::api::Backend;
use crate::config::Config;
use crate::dialogue::{DialogueRelay, PracticeChat, RelayReply, Transcript};
use crate::error::{Result, TutorError};

/// Events the driver posts to itself
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PracticeEvent {
    /// The delay after a correct answer ran out
    AutoAdvance { generation: u64 },
}

/// Runs one practice dialog: the session, its chat and the auto-advance timer
pub struct PracticeDriver {
    session: PracticeSession,
    relay: DialogueRelay<PracticeChat>,
    backend: Arc<dyn Backend>,
    question_limit: usize,
    auto_advance_delay: Duration,
    events_tx: mpsc::UnboundedSender<PracticeEvent>,
    events_rx: mpsc::UnboundedReceiver<PracticeEvent>,
    pending_advance: Option<JoinHandle<()>>,
    closed: bool,
}

impl PracticeDriver {
    pub fn new(backend: Arc<dyn Backend>, knowledge_point: impl Into<String>, config: &Config) -> Self {
        let knowledge_point = knowledge_point.into();
        let relay = DialogueRelay::new(
            PracticeChat::new(knowledge_point.clone()),
            Arc::clone(&backend),
            config.dialogue.practice_max_chars,
        );
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        Self {
            session: PracticeSession::new(knowledge_point, config.practice.max_wrong_attempts),
            relay,
            backend,
            question_limit: config.practice.question_limit,
            auto_advance_delay: config.practice.auto_advance_delay(),
            events_tx,
            events_rx,
            pending_advance: None,
            closed: false,
        }
    }

    pub fn session(&self) -> &PracticeSession {
        &self.session
    }

    pub fn phase(&self) -> &Phase {
        self.session.phase()
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.session.current()
    }

    pub fn relay(&self) -> &DialogueRelay<PracticeChat> {
        &self.relay
    }

    pub fn transcript(&self) -> &Transcript {
        self.relay.transcript()
    }

    /// Whether an auto-advance is armed
    pub fn advance_pending(&self) -> bool {
        self.pending_advance.as_ref().map_or(false, |h| !h.is_finished())
    }

    /// Fetch the questions and show the first one
    pub async fn open(&mut self) -> Result<&Phase> {
        self.ensure_open()?;
        self.cancel_advance();
        self.session.begin_loading();

        let knowledge_point = self.session.knowledge_point().to_string();
        info!("📥 Loading practice questions for '{}'", knowledge_point);

        match self.backend.practice_questions(&knowledge_point, self.question_limit).await {
            Ok(records) => {
                if self.session.load(records) == &Phase::NoQuestions {
                    self.relay.push_notice(messages::NO_QUESTIONS);
                }
                self.sync_question();
                Ok(self.session.phase())
            }
            Err(e) => {
                warn!("Failed to load questions: {}", e);
                self.session.load_failed(e.to_string());
                self.relay.push_notice(messages::LOAD_FAILED);
                Err(e)
            }
        }
    }

    /// Re-run the fetch after a load error
    pub async fn retry(&mut self) -> Result<&Phase> {
        self.open().await
    }

    pub fn select(&mut self, letter: char) -> Result<()> {
        self.ensure_open()?;
        self.session.select(letter)
    }

    /// Submit the selected option and react to the verdict
    pub async fn submit(&mut self) -> Result<SubmitOutcome> {
        self.ensure_open()?;

        let (letter, outcome) = match self.session.submit() {
            Ok(verdict) => verdict,
            Err(TutorError::NoSelection) => {
                self.relay.push_assistant(messages::SELECT_FIRST);
                return Err(TutorError::NoSelection);
            }
            Err(TutorError::AlreadyAnswered) => {
                self.relay.push_assistant(messages::ALREADY_ANSWERED);
                return Err(TutorError::AlreadyAnswered);
            }
            Err(e) => return Err(e),
        };

        self.relay.push_user(messages::selected_answer(letter));

        match outcome {
            SubmitOutcome::Correct => {
                self.relay.push_assistant(messages::CORRECT);
                self.schedule_advance();
            }
            SubmitOutcome::Wrong { attempts_left } => {
                self.relay.push_assistant(messages::wrong_answer(attempts_left));
            }
            SubmitOutcome::HintRequested { wrong_attempts } => {
                info!("Requesting hint after {} wrong answers", wrong_attempts);
                self.relay.push_assistant(messages::HINT_INTRO);
                if let Err(e) = self.relay.ask(messages::HINT_PROMPT).await {
                    warn!("Hint request failed: {}", e);
                }
            }
        }

        Ok(outcome)
    }

    /// Move on without answering
    pub fn skip(&mut self) -> Result<&Phase> {
        self.ensure_open()?;
        self.cancel_advance();
        self.session.skip()?;
        self.after_question_change();
        Ok(self.session.phase())
    }

    /// Wait for the next posted event
    pub async fn next_event(&mut self) -> Option<PracticeEvent> {
        self.events_rx.recv().await
    }

    /// Apply an event; stale ones are dropped. Returns whether it acted.
    pub fn handle_event(&mut self, event: PracticeEvent) -> bool {
        if self.closed {
            return false;
        }

        match event {
            PracticeEvent::AutoAdvance { generation } => {
                if generation != self.session.generation() || self.session.current().is_none() {
                    debug!("Ignoring stale auto-advance for generation {}", generation);
                    return false;
                }

                self.pending_advance = None;
                self.relay.push_assistant(messages::LOADING_NEXT);
                if let Err(e) = self.session.advance() {
                    warn!("Auto-advance failed: {}", e);
                    return false;
                }
                self.after_question_change();
                true
            }
        }
    }

    /// Wait out an armed auto-advance and apply it
    pub async fn await_auto_advance(&mut self) -> bool {
        while self.pending_advance.is_some() {
            let Some(event) = self.next_event().await else {
                break;
            };
            if self.handle_event(event) {
                return true;
            }
        }
        false
    }

    /// Free-form question to the practice tutor
    pub async fn send_message(&mut self, message: &str) -> Result<RelayReply> {
        self.ensure_open()?;
        self.relay.send(message).await
    }

    pub async fn regenerate(&mut self, index: usize) -> Result<RelayReply> {
        self.ensure_open()?;
        self.relay.regenerate(index).await
    }

    pub fn back_to_focus(&mut self) -> Result<RelayReply> {
        self.ensure_open()?;
        Ok(self.relay.back_to_focus())
    }

    /// Close the dialog; a pending auto-advance never fires afterwards
    pub fn close(&mut self) {
        if self.closed {
            return;
        }
        self.cancel_advance();
        self.closed = true;
        debug!("Practice dialog for '{}' closed", self.session.knowledge_point());
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed {
            Err(TutorError::SessionClosed)
        } else {
            Ok(())
        }
    }

    fn schedule_advance(&mut self) {
        self.cancel_advance();

        let generation = self.session.generation();
        let delay = self.auto_advance_delay;
        let tx = self.events_tx.clone();

        debug!("Auto-advance armed for generation {} in {:?}", generation, delay);
        self.pending_advance = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = tx.send(PracticeEvent::AutoAdvance { generation });
        }));
    }

    fn cancel_advance(&mut self) {
        if let Some(handle) = self.pending_advance.take() {
            handle.abort();
        }
    }

    fn after_question_change(&mut self) {
        self.sync_question();
        if self.session.is_complete() {
            let summary = self.session.summary();
            self.relay.push_assistant(summary);
        }
    }

    /// The chat keeps the last shown question once the session ends
    fn sync_question(&mut self) {
        if let Some(question) = self.session.current() {
            let record = question.record().clone();
            self.relay.adapter_mut().set_question(Some(record));
        }
    }
}

impl Drop for PracticeDriver {
    fn drop(&mut self) {
        self.cancel_advance();
    }
}
