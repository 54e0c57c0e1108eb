//! Backend API module
//!
//! The tutor never generates content itself. Processing, question matching and
//! every chat reply come from the backend behind the [`Backend`] trait.

use async_trait::async_trait;

use crate::error::Result;

pub mod client;
pub mod models;

pub use client::HttpBackend;
pub use models::*;

/// Operations the backend exposes to the tutor
///
/// Implementations report `success: false` payloads as
/// [`TutorError::Server`](crate::error::TutorError::Server) so callers only
/// see successful replies in the `Ok` arm.
#[async_trait]
pub trait Backend: Send + Sync {
    /// Upload a video and run the processing pipeline
    async fn process_video(&self, upload: VideoUpload) -> Result<ProcessVideoResponse>;

    /// Fetch up to `limit` practice questions for a knowledge point
    async fn practice_questions(&self, knowledge_point: &str, limit: usize) -> Result<Vec<QuestionRecord>>;

    /// Tutor reply for the practice dialog
    async fn chat_for_practice(&self, request: &PracticeChatRequest) -> Result<String>;

    /// Tutor reply for the knowledge-point chat, including the new dialogue state
    async fn chat_for_knowledge_point(&self, request: &KnowledgePointChatRequest) -> Result<KnowledgePointChatResponse>;

    /// Tutor reply for the video-wide chat
    async fn chat_for_video(&self, request: &VideoChatRequest) -> Result<String>;

    /// Render content into a downloadable file
    async fn download(&self, request: &DownloadRequest) -> Result<Vec<u8>>;
}
