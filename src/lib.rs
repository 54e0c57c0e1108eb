/// Video Tutor - Rust Implementation
///
/// Client-side engine for lecture videos split into knowledge points: keeps
/// playback in sync with the point list, runs short practice quizzes and relays
/// tutor chat to the processing backend.

pub mod api;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod export;
pub mod knowledge;
pub mod practice;
pub mod timestamp;
pub mod workspace;

// Re-export main types for easy access
pub use crate::api::{Backend, HttpBackend};
pub use crate::config::Config;
pub use crate::dialogue::{DialogueRelay, KnowledgePointChat, PracticeChat, Surface, SurfaceAdapter, VideoChat};
pub use crate::error::{Result, TutorError};
pub use crate::export::{ExportKind, Exporter};
pub use crate::knowledge::{KnowledgePoint, KnowledgeRegistry, Language, MediaElement, ReadyState, TimelineTracker};
pub use crate::practice::{Phase, PracticeDriver, PracticeSession, Question, SubmitOutcome};
pub use crate::workspace::VideoWorkspace;
