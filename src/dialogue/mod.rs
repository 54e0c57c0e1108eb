//! Dialogue relay shared by the three chat surfaces
//!
//! The video page, the knowledge-point chat and the practice dialog all run
//! the same loop: append the user's message, ask the backend, fold the reply
//! back in. [`DialogueRelay`] owns that loop once; a [`SurfaceAdapter`] per
//! surface supplies the endpoint and request shape.

pub mod control;
pub mod relay;
pub mod surfaces;

pub use control::{ControlFlag, ControlGuard};
pub use relay::{DialogueRelay, RelayReply};
pub use surfaces::{Exchange, ExchangeReply, KnowledgePointChat, PracticeChat, SurfaceAdapter, VideoChat};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::api::models::HistoryEntry;

/// The chat UIs a relay can back
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Surface {
    Video,
    KnowledgePoint,
    Practice,
}

impl fmt::Display for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Surface::Video => write!(f, "video"),
            Surface::KnowledgePoint => write!(f, "knowledge point"),
            Surface::Practice => write!(f, "practice"),
        }
    }
}

/// Who a transcript line belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
    /// Inline error, guidance or status line; never sent as history
    Notice,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Notice => "notice",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    pub role: Role,
    pub content: String,
    /// Local wall-clock time the entry was written, `HH:MM:SS`
    pub timestamp: String,
}

impl TranscriptEntry {
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: chrono::Local::now().format("%H:%M:%S").to_string(),
        }
    }

    fn to_history(&self) -> HistoryEntry {
        HistoryEntry {
            role: self.role.as_str().to_string(),
            content: self.content.clone(),
            timestamp: self.timestamp.clone(),
        }
    }
}

/// Ordered chat lines of one surface; the UI renders a projection of this
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    entries: Vec<TranscriptEntry>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) -> usize {
        self.entries.push(TranscriptEntry::new(role, content));
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&TranscriptEntry> {
        self.entries.get(index)
    }

    pub fn last(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Swap the content of an entry in place, keeping its position
    pub(crate) fn replace(&mut self, index: usize, content: impl Into<String>) -> bool {
        match self.entries.get_mut(index) {
            Some(entry) => {
                *entry = TranscriptEntry::new(entry.role, content);
                true
            }
            None => false,
        }
    }

    /// History the backend sees for everything before `end`.
    ///
    /// Notices are dropped, as are user lines that never got an answer.
    pub fn history_before(&self, end: usize) -> Vec<HistoryEntry> {
        let visible = &self.entries[..end.min(self.entries.len())];
        visible
            .iter()
            .enumerate()
            .filter(|(i, entry)| match entry.role {
                Role::Assistant => true,
                Role::User => visible.get(i + 1).map_or(false, |next| next.role == Role::Assistant),
                Role::Notice => false,
            })
            .map(|(_, entry)| entry.to_history())
            .collect()
    }
}

/// Server-tracked dialogue counters; replaced wholesale by every reply
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueState {
    #[serde(default)]
    pub round: u32,
    #[serde(default)]
    pub focus_deviation_count: u32,
    /// Anything else the server tracks, passed back untouched
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DialogueState {
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|_| Value::Object(Map::new()))
    }
}

/// Status bar summary of a dialogue
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DialogueStatus {
    pub round: u32,
    pub focus_deviated: bool,
    /// Rough understanding meter, 10% per round capped at 100
    pub understanding_progress: u32,
}

impl From<&DialogueState> for DialogueStatus {
    fn from(state: &DialogueState) -> Self {
        Self {
            round: state.round,
            focus_deviated: state.focus_deviation_count > 0,
            understanding_progress: state.round.saturating_mul(10).min(100),
        }
    }
}
