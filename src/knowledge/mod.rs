/// Knowledge point module
///
/// Knowledge points are the titled, time-bounded segments a processed video is
/// split into. The registry holds them for one video, the tracker follows
/// playback across them.

pub mod media;
pub mod registry;
pub mod tracker;

// Re-export main types
pub use media::{MediaElement, ReadyState};
pub use registry::{IndexSource, KnowledgeRegistry};
pub use tracker::{active_index, ActiveChange, TimelineTracker};

use serde::{Deserialize, Serialize};

/// A titled segment of instructional content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgePoint {
    /// Segment title, unique within a registry
    pub title: String,
    pub start_seconds: u32,
    /// Never below `start_seconds`
    pub end_seconds: u32,
    /// Canonical `HH:MM:SS`
    pub start_time_text: String,
    /// Canonical `HH:MM:SS`
    pub end_time_text: String,
    pub description: String,
    pub key_phrase: Option<String>,
    pub category: String,
    pub importance: String,
    pub difficulty: String,
}

impl KnowledgePoint {
    pub fn duration_seconds(&self) -> u32 {
        self.end_seconds - self.start_seconds
    }

    /// Whether `position` falls inside the closed window `[start, end]`
    pub fn contains(&self, position: f64) -> bool {
        position >= f64::from(self.start_seconds) && position <= f64::from(self.end_seconds)
    }
}

/// Timing looked up by title when an inline reference is followed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimingEntry {
    pub start_time: String,
    pub end_time: String,
    pub start_seconds: u32,
    pub end_seconds: u32,
    pub description: String,
}

/// Display language, used for placeholder labels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Language {
    English,
    Chinese,
}

impl Language {
    /// Anything that is not English falls back to Chinese labels
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("english") {
            Language::English
        } else {
            Language::Chinese
        }
    }

    pub fn unknown_segment(&self) -> &'static str {
        match self {
            Language::English => "Unknown Segment",
            Language::Chinese => "未知片段",
        }
    }

    pub fn default_category(&self) -> &'static str {
        match self {
            Language::English => "Concept",
            Language::Chinese => "概念",
        }
    }

    pub fn default_difficulty(&self) -> &'static str {
        match self {
            Language::English => "Basic",
            Language::Chinese => "基础",
        }
    }
}
