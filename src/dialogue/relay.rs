use std::sync::Arc;
use tracing::{debug, info, warn};

use super::control::ControlFlag;
use super::surfaces::{Exchange, SurfaceAdapter};
use super::{DialogueState, DialogueStatus, Role, Surface, Transcript};
use crate::api::models::HistoryEntry;
use crate::api::Backend;
use crate::error::{Result, TutorError};

const SERVER_APOLOGY: &str = "Sorry, I cannot reply at the moment. Please try again later.";
const NETWORK_APOLOGY: &str = "Sorry, there is a problem with the network connection. Please try again later.";

/// Reply folded into the transcript
#[derive(Debug, Clone, PartialEq)]
pub struct RelayReply {
    /// Transcript position of the assistant entry
    pub index: usize,
    pub content: String,
}

/// Conversation engine for one chat surface
pub struct DialogueRelay<A: SurfaceAdapter> {
    adapter: A,
    backend: Arc<dyn Backend>,
    transcript: Transcript,
    state: DialogueState,
    suggestions: Vec<String>,
    default_suggestions: Vec<String>,
    max_chars: usize,
    send_control: ControlFlag,
    regenerate_control: ControlFlag,
}

impl<A: SurfaceAdapter> DialogueRelay<A> {
    pub fn new(adapter: A, backend: Arc<dyn Backend>, max_chars: usize) -> Self {
        Self {
            adapter,
            backend,
            transcript: Transcript::new(),
            state: DialogueState::default(),
            suggestions: Vec::new(),
            default_suggestions: Vec::new(),
            max_chars,
            send_control: ControlFlag::new(),
            regenerate_control: ControlFlag::new(),
        }
    }

    /// Suggestions shown initially and after a reset
    pub fn with_default_suggestions(mut self, suggestions: Vec<String>) -> Self {
        self.suggestions = suggestions.clone();
        self.default_suggestions = suggestions;
        self
    }

    pub fn surface(&self) -> Surface {
        self.adapter.surface()
    }

    pub fn adapter(&self) -> &A {
        &self.adapter
    }

    pub fn adapter_mut(&mut self) -> &mut A {
        &mut self.adapter
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn state(&self) -> &DialogueState {
        &self.state
    }

    pub fn status(&self) -> DialogueStatus {
        DialogueStatus::from(&self.state)
    }

    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    pub fn max_chars(&self) -> usize {
        self.max_chars
    }

    /// Flag the send button mirrors
    pub fn send_control(&self) -> &ControlFlag {
        &self.send_control
    }

    /// Flag the regenerate buttons mirror
    pub fn regenerate_control(&self) -> &ControlFlag {
        &self.regenerate_control
    }

    /// Append an assistant line without a backend round-trip
    pub fn push_assistant(&mut self, content: impl Into<String>) -> usize {
        self.transcript.push(Role::Assistant, content)
    }

    /// Append a user line without a backend round-trip
    pub fn push_user(&mut self, content: impl Into<String>) -> usize {
        self.transcript.push(Role::User, content)
    }

    /// Append an inline notice
    pub fn push_notice(&mut self, content: impl Into<String>) -> usize {
        self.transcript.push(Role::Notice, content)
    }

    /// Send a user message.
    ///
    /// The message is in the transcript before the request goes out. On
    /// failure an apology notice follows it and the dialogue state is kept.
    pub async fn send(&mut self, message: &str) -> Result<RelayReply> {
        let message = message.trim();
        if message.is_empty() {
            return Err(TutorError::EmptyMessage);
        }
        if message.chars().count() > self.max_chars {
            return Err(TutorError::MessageTooLong { limit: self.max_chars });
        }

        let _guard = self
            .send_control
            .try_acquire()
            .ok_or(TutorError::Busy(self.surface()))?;

        let history = self.transcript.history_before(self.transcript.len());
        self.transcript.push(Role::User, message);
        self.deliver(message, history).await
    }

    /// Ask the backend on the learner's behalf; only the reply is shown
    pub async fn ask(&mut self, prompt: &str) -> Result<RelayReply> {
        let _guard = self
            .send_control
            .try_acquire()
            .ok_or(TutorError::Busy(self.surface()))?;

        let history = self.transcript.history_before(self.transcript.len());
        self.deliver(prompt, history).await
    }

    async fn deliver(&mut self, message: &str, history: Vec<HistoryEntry>) -> Result<RelayReply> {
        let surface = self.surface();
        debug!("Relaying {} chat message ({} history entries)", surface, history.len());

        let outcome = self
            .adapter
            .exchange(
                self.backend.as_ref(),
                Exchange {
                    message,
                    history,
                    state: &self.state,
                },
            )
            .await;

        match outcome {
            Ok(reply) => {
                if let Some(state) = reply.state {
                    self.state = state;
                }
                if !reply.suggestions.is_empty() {
                    self.suggestions = reply.suggestions;
                }
                let index = self.transcript.push(Role::Assistant, reply.reply.clone());
                Ok(RelayReply {
                    index,
                    content: reply.reply,
                })
            }
            Err(e) => {
                warn!("❌ {} chat request failed: {}", surface, e);
                self.transcript.push(Role::Notice, apology_for(&e));
                Err(e)
            }
        }
    }

    /// Replace the assistant reply at `index` with a fresh one.
    ///
    /// The entry directly before it must be the user message it answered.
    /// History sent along stops before that exchange.
    pub async fn regenerate(&mut self, index: usize) -> Result<RelayReply> {
        let user_message = match (index.checked_sub(1).and_then(|i| self.transcript.get(i)), self.transcript.get(index)) {
            (Some(user), Some(reply)) if user.role == Role::User && reply.role == Role::Assistant => {
                user.content.clone()
            }
            _ => return Err(TutorError::NoCorrespondingUserMessage),
        };

        let _guard = self
            .regenerate_control
            .try_acquire()
            .ok_or(TutorError::Busy(self.surface()))?;

        let history = self.transcript.history_before(index - 1);
        let outcome = self
            .adapter
            .exchange(
                self.backend.as_ref(),
                Exchange {
                    message: &user_message,
                    history,
                    state: &self.state,
                },
            )
            .await;

        match outcome {
            Ok(reply) => {
                if let Some(state) = reply.state {
                    self.state = state;
                }
                if !reply.suggestions.is_empty() {
                    self.suggestions = reply.suggestions;
                }
                self.transcript.replace(index, reply.reply.clone());
                debug!("Regenerated {} reply at {}", self.surface(), index);
                Ok(RelayReply {
                    index,
                    content: reply.reply,
                })
            }
            Err(e) => {
                warn!("Regeneration failed: {}", e);
                self.transcript.push(Role::Notice, format!("Regeneration failed: {}", e));
                Err(e)
            }
        }
    }

    /// Steer the learner back to the focus title, locally
    pub fn back_to_focus(&mut self) -> RelayReply {
        let title = self.adapter.focus_title().unwrap_or("this knowledge point");
        let content = format!(
            "Let's get back to \"{}\". Please tell me which aspect of this knowledge point you want to know.",
            title
        );
        let index = self.transcript.push(Role::Assistant, content.clone());
        RelayReply { index, content }
    }

    /// Clear the conversation and the server counters
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.state = DialogueState::default();
        self.suggestions = self.default_suggestions.clone();
        info!("🔄 {} dialogue reset", self.surface());
    }
}

fn apology_for(error: &TutorError) -> &'static str {
    match error {
        TutorError::Server(_) => SERVER_APOLOGY,
        e if e.is_transport() => NETWORK_APOLOGY,
        _ => SERVER_APOLOGY,
    }
}
