/// Per-surface request adapters
use async_trait::async_trait;
use tracing::warn;

use super::{DialogueState, Surface};
use crate::api::models::{
    HistoryEntry, KnowledgePointChatRequest, KnowledgePointContext, PracticeChatRequest, QuestionRecord,
    VideoChatRequest, VideoContext,
};
use crate::api::Backend;
use crate::error::Result;

/// One outgoing chat turn
#[derive(Debug, Clone)]
pub struct Exchange<'a> {
    pub message: &'a str,
    /// Prior turns the backend should see
    pub history: Vec<HistoryEntry>,
    pub state: &'a DialogueState,
}

/// What a surface got back from the backend
#[derive(Debug, Clone, Default)]
pub struct ExchangeReply {
    pub reply: String,
    /// Replacement dialogue state, when the endpoint tracks one
    pub state: Option<DialogueState>,
    pub suggestions: Vec<String>,
}

/// Endpoint and request shape of one chat surface
#[async_trait]
pub trait SurfaceAdapter: Send + Sync {
    fn surface(&self) -> Surface;

    /// Title the focus redirect points the learner back to
    fn focus_title(&self) -> Option<&str>;

    async fn exchange(&self, backend: &dyn Backend, exchange: Exchange<'_>) -> Result<ExchangeReply>;
}

/// Whole-video chat on the player page
#[derive(Debug, Clone, Default)]
pub struct VideoChat {
    context: VideoContext,
}

impl VideoChat {
    pub fn new(context: VideoContext) -> Self {
        Self { context }
    }

    pub fn context(&self) -> &VideoContext {
        &self.context
    }

    /// Refresh playback position, points or summary before the next send
    pub fn set_context(&mut self, context: VideoContext) {
        self.context = context;
    }
}

#[async_trait]
impl SurfaceAdapter for VideoChat {
    fn surface(&self) -> Surface {
        Surface::Video
    }

    fn focus_title(&self) -> Option<&str> {
        Some(self.context.title.as_str()).filter(|t| !t.is_empty())
    }

    async fn exchange(&self, backend: &dyn Backend, exchange: Exchange<'_>) -> Result<ExchangeReply> {
        let request = VideoChatRequest {
            message: exchange.message.to_string(),
            video_data: self.context.clone(),
            dialogue_history: exchange.history,
        };

        let reply = backend.chat_for_video(&request).await?;
        Ok(ExchangeReply {
            reply,
            ..Default::default()
        })
    }
}

/// Focused chat about a single knowledge point
#[derive(Debug, Clone)]
pub struct KnowledgePointChat {
    point: KnowledgePointContext,
    language: String,
}

impl KnowledgePointChat {
    pub fn new(point: KnowledgePointContext, language: impl Into<String>) -> Self {
        Self {
            point,
            language: language.into(),
        }
    }

    pub fn point(&self) -> &KnowledgePointContext {
        &self.point
    }
}

#[async_trait]
impl SurfaceAdapter for KnowledgePointChat {
    fn surface(&self) -> Surface {
        Surface::KnowledgePoint
    }

    fn focus_title(&self) -> Option<&str> {
        Some(self.point.title.as_str()).filter(|t| !t.is_empty())
    }

    async fn exchange(&self, backend: &dyn Backend, exchange: Exchange<'_>) -> Result<ExchangeReply> {
        let request = KnowledgePointChatRequest {
            message: exchange.message.to_string(),
            knowledge_point_data: self.point.clone(),
            dialogue_history: exchange.history,
            dialogue_state: exchange.state.to_value(),
            language: self.language.clone(),
        };

        let response = backend.chat_for_knowledge_point(&request).await?;

        let state = response.dialogue_state.and_then(|value| {
            serde_json::from_value::<DialogueState>(value)
                .map_err(|e| warn!("Ignoring malformed dialogue_state: {}", e))
                .ok()
        });

        Ok(ExchangeReply {
            reply: response.response.unwrap_or_default(),
            state,
            suggestions: response.suggested_questions,
        })
    }
}

/// Tutor chat inside the practice dialog
#[derive(Debug, Clone)]
pub struct PracticeChat {
    knowledge_point: String,
    question: Option<QuestionRecord>,
}

impl PracticeChat {
    pub fn new(knowledge_point: impl Into<String>) -> Self {
        Self {
            knowledge_point: knowledge_point.into(),
            question: None,
        }
    }

    pub fn knowledge_point(&self) -> &str {
        &self.knowledge_point
    }

    /// Question the tutor should reason about; follows the session cursor
    pub fn set_question(&mut self, question: Option<QuestionRecord>) {
        self.question = question;
    }
}

#[async_trait]
impl SurfaceAdapter for PracticeChat {
    fn surface(&self) -> Surface {
        Surface::Practice
    }

    fn focus_title(&self) -> Option<&str> {
        Some(self.knowledge_point.as_str()).filter(|t| !t.is_empty())
    }

    async fn exchange(&self, backend: &dyn Backend, exchange: Exchange<'_>) -> Result<ExchangeReply> {
        let request = PracticeChatRequest {
            knowledge_point: self.knowledge_point.clone(),
            question: self.question.clone(),
            user_message: exchange.message.to_string(),
        };

        let reply = backend.chat_for_practice(&request).await?;
        Ok(ExchangeReply {
            reply,
            ..Default::default()
        })
    }
}
