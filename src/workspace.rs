//! Video page state
//!
//! One workspace per open video: the processed knowledge points, the summary,
//! the playback tracker and the video-wide chat. A new processing run swaps
//! the registry out wholesale; readers holding the old `Arc` keep a
//! consistent view until they drop it.

use std::sync::Arc;
use tracing::{info, warn};

use crate::api::models::{KnowledgePointContext, ProcessVideoResponse, VideoContext, VideoContextPoint, VideoUpload};
use crate::api::Backend;
use crate::config::Config;
use crate::dialogue::{DialogueRelay, KnowledgePointChat, RelayReply, VideoChat};
use crate::error::{Result, TutorError};
use crate::knowledge::{ActiveChange, KnowledgeRegistry, Language, MediaElement, TimelineTracker};
use crate::practice::PracticeDriver;
use crate::timestamp::{find_timestamp_refs, format_timestamp, TimestampRef};

pub struct VideoWorkspace {
    backend: Arc<dyn Backend>,
    config: Config,
    language: Language,
    title: String,
    registry: Arc<KnowledgeRegistry>,
    summary: String,
    video_path: Option<String>,
    tracker: TimelineTracker,
    chat: DialogueRelay<VideoChat>,
}

impl VideoWorkspace {
    pub fn new(backend: Arc<dyn Backend>, config: &Config) -> Self {
        let chat = DialogueRelay::new(
            VideoChat::default(),
            Arc::clone(&backend),
            config.dialogue.video_max_chars,
        );

        Self {
            backend,
            config: config.clone(),
            language: Language::from_name(&config.dialogue.language),
            title: String::new(),
            registry: Arc::new(KnowledgeRegistry::empty()),
            summary: String::new(),
            video_path: None,
            tracker: TimelineTracker::new(config.timeline.auto_scroll, config.timeline.seek_step_seconds),
            chat,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn registry(&self) -> Arc<KnowledgeRegistry> {
        Arc::clone(&self.registry)
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn video_path(&self) -> Option<&str> {
        self.video_path.as_deref()
    }

    pub fn tracker(&self) -> &TimelineTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut TimelineTracker {
        &mut self.tracker
    }

    pub fn chat(&self) -> &DialogueRelay<VideoChat> {
        &self.chat
    }

    pub fn chat_mut(&mut self) -> &mut DialogueRelay<VideoChat> {
        &mut self.chat
    }

    /// Upload a video and install the result
    pub async fn process(&mut self, upload: VideoUpload) -> Result<Arc<KnowledgeRegistry>> {
        let title = upload.title.clone();
        info!("🎬 Processing video: {} ({} bytes)", upload.file_name, upload.bytes.len());

        let response = self.backend.process_video(upload).await?;
        Ok(self.apply_response(title, &response))
    }

    /// Replace registry, summary and video path from a processing response
    pub fn apply_response(&mut self, title: impl Into<String>, response: &ProcessVideoResponse) -> Arc<KnowledgeRegistry> {
        self.title = title.into();
        self.registry = Arc::new(KnowledgeRegistry::build(response, self.language));
        self.summary = response.summary_text();
        self.video_path = response.video_path.clone();
        self.tracker.reset();
        self.chat.reset();

        if self.summary.is_empty() {
            warn!("Processing response for '{}' carried no summary", self.title);
        }
        info!("✅ Workspace ready: {} knowledge points", self.registry.len());

        self.registry()
    }

    /// Feed a playback position into the tracker
    pub fn on_time_update(&mut self, position: f64) -> Option<ActiveChange> {
        self.tracker.update(&self.registry, position)
    }

    pub fn jump<M: MediaElement + ?Sized>(&mut self, media: &mut M, index: usize) -> bool {
        self.tracker.jump(media, &self.registry, index)
    }

    pub fn jump_to_title<M: MediaElement + ?Sized>(&mut self, media: &mut M, title: &str) -> bool {
        self.tracker.jump_to_title(media, &self.registry, title)
    }

    pub fn jump_to_reference<M: MediaElement + ?Sized>(&mut self, media: &mut M, reference: &TimestampRef) -> bool {
        self.tracker
            .jump_to_timestamp(media, &self.registry, &format_timestamp(reference.start_seconds))
    }

    /// Clickable timestamp markers in the summary
    pub fn summary_refs(&self) -> Vec<TimestampRef> {
        find_timestamp_refs(&self.summary)
    }

    /// Context the video chat sends along with each message
    pub fn video_context<M: MediaElement + ?Sized>(&self, media: &M) -> VideoContext {
        self.video_context_at(media.current_time(), media.duration())
    }

    pub fn video_context_at(&self, position: f64, duration: Option<f64>) -> VideoContext {
        VideoContext {
            title: self.display_title().to_string(),
            current_time: position,
            duration: duration.filter(|d| d.is_finite()).unwrap_or(0.0),
            knowledge_points: self
                .registry
                .points()
                .iter()
                .map(|p| VideoContextPoint {
                    title: p.title.clone(),
                    time: p.start_time_text.clone(),
                })
                .collect(),
            summary: self.summary.clone(),
        }
    }

    /// Ask the video chat, with the player's current position as context
    pub async fn send_chat<M: MediaElement + ?Sized>(&mut self, media: &M, message: &str) -> Result<RelayReply> {
        let context = self.video_context(media);
        self.chat.adapter_mut().set_context(context);
        self.chat.send(message).await
    }

    /// Chat focused on one knowledge point
    pub fn knowledge_point_chat(&self, index: usize) -> Result<DialogueRelay<KnowledgePointChat>> {
        let point = self
            .registry
            .get(index)
            .ok_or_else(|| TutorError::UnknownKnowledgePoint(format!("at index {}", index)))?;

        let context = KnowledgePointContext {
            title: point.title.clone(),
            timestamp: point.start_time_text.clone(),
            video_title: self.display_title().to_string(),
            related_concepts: point.title.clone(),
            content: format!(
                "This is the knowledge point content about \"{}\". The knowledge point appears at the {} time point in the video.",
                point.title, point.start_time_text
            ),
            language: self.config.dialogue.language.clone(),
        };

        let adapter = KnowledgePointChat::new(context, self.config.dialogue.language.clone());
        Ok(DialogueRelay::new(
            adapter,
            Arc::clone(&self.backend),
            self.config.dialogue.knowledge_point_max_chars,
        )
        .with_default_suggestions(self.config.dialogue.default_suggestions.clone()))
    }

    /// Practice dialog for a knowledge point title
    pub fn practice(&self, knowledge_point: &str) -> PracticeDriver {
        PracticeDriver::new(Arc::clone(&self.backend), knowledge_point, &self.config)
    }

    fn display_title(&self) -> &str {
        if self.title.is_empty() {
            "Untitled video"
        } else {
            &self.title
        }
    }
}
