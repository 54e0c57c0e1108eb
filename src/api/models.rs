//! Backend wire models
//!
//! These mirror the JSON the backend actually sends, which is loose: fields
//! go missing, arrays arrive as `null`, and the same concept shows up under
//! several keys. Everything is optional here and normalised later by the
//! registry and the practice session.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Treat an explicit JSON `null` like a missing field
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Response of `POST /process_video`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProcessVideoResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub analysis: Option<VideoAnalysis>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub knowledge_points: Vec<RawKnowledgePoint>,
    #[serde(default)]
    pub integrated_summary: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub timestamp_mapping: BTreeMap<String, RawTimingEntry>,
    #[serde(default)]
    pub video_path: Option<String>,
    #[serde(default)]
    pub processor_version: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ProcessVideoResponse {
    /// Summary text, preferring the integrated summary of the new processor
    pub fn summary_text(&self) -> String {
        if self.processor_version.as_deref() == Some("new") {
            if let Some(summary) = self.integrated_summary.as_ref().filter(|s| !s.is_empty()) {
                return summary.clone();
            }
        }

        self.analysis
            .as_ref()
            .and_then(|a| a.summary.clone())
            .filter(|s| !s.is_empty())
            .or_else(|| self.summary.clone())
            .unwrap_or_default()
    }
}

/// Legacy analysis block nested in the processing response
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VideoAnalysis {
    #[serde(default, deserialize_with = "null_as_default")]
    pub content_segments: Vec<RawKnowledgePoint>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub knowledge_points: Vec<RawKnowledgePoint>,
    #[serde(default)]
    pub summary: Option<String>,
}

/// A knowledge point as the backend sends it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawKnowledgePoint {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub concept: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default, rename = "startTime")]
    pub start_time_camel: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default, rename = "endTime")]
    pub end_time_camel: Option<String>,
    #[serde(default)]
    pub start_seconds: Option<f64>,
    #[serde(default)]
    pub end_seconds: Option<f64>,
    #[serde(default)]
    pub duration_seconds: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub key_phrase: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub importance: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
}

impl RawKnowledgePoint {
    pub fn resolved_title(&self) -> Option<&str> {
        [&self.title, &self.concept, &self.name]
            .into_iter()
            .filter_map(|t| t.as_deref())
            .find(|t| !t.trim().is_empty())
    }

    pub fn start_text(&self) -> Option<&str> {
        self.start_time
            .as_deref()
            .or(self.start_time_camel.as_deref())
            .filter(|t| !t.trim().is_empty())
    }

    pub fn end_text(&self) -> Option<&str> {
        self.end_time
            .as_deref()
            .or(self.end_time_camel.as_deref())
            .filter(|t| !t.trim().is_empty())
    }
}

/// Value of the explicit `timestamp_mapping` object
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTimingEntry {
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
    #[serde(default)]
    pub start_seconds: Option<f64>,
    #[serde(default)]
    pub end_seconds: Option<f64>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Response of `GET /get_practice_session/{title}`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PracticeSessionResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub session: Option<PracticeSessionPayload>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PracticeSessionPayload {
    #[serde(default, deserialize_with = "null_as_default")]
    pub questions: Vec<QuestionRecord>,
}

/// Question record shape used by the practice endpoints
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestionRecord {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default, rename = "optionA")]
    pub option_a: Option<String>,
    #[serde(default, rename = "optionB")]
    pub option_b: Option<String>,
    #[serde(default, rename = "optionC")]
    pub option_c: Option<String>,
    #[serde(default, rename = "optionD")]
    pub option_d: Option<String>,
    #[serde(default, rename = "optionE")]
    pub option_e: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub difficulty: Option<String>,
    #[serde(default)]
    pub difficulty_level: Option<u32>,
    #[serde(default)]
    pub relevance_score: Option<f64>,
    #[serde(default)]
    pub expected_match: Option<String>,
}

/// Body of `POST /chat_for_practice`
#[derive(Debug, Clone, Serialize)]
pub struct PracticeChatRequest {
    pub knowledge_point: String,
    pub question: Option<QuestionRecord>,
    pub user_message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PracticeChatResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub llm_response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// One transcript line as the chat endpoints expect it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
    pub timestamp: String,
}

/// Context the knowledge-point chat carries about its point
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct KnowledgePointContext {
    pub title: String,
    pub timestamp: String,
    pub video_title: String,
    pub related_concepts: String,
    pub content: String,
    pub language: String,
}

/// Body of `POST /chat_for_knowledge_point`
#[derive(Debug, Clone, Serialize)]
pub struct KnowledgePointChatRequest {
    pub message: String,
    pub knowledge_point_data: KnowledgePointContext,
    pub dialogue_history: Vec<HistoryEntry>,
    pub dialogue_state: Value,
    pub language: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KnowledgePointChatResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub dialogue_state: Option<Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub suggested_questions: Vec<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Video context sent with every video chat message
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VideoContext {
    pub title: String,
    pub current_time: f64,
    pub duration: f64,
    pub knowledge_points: Vec<VideoContextPoint>,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoContextPoint {
    pub title: String,
    pub time: String,
}

/// Body of `POST /chat_for_video`
#[derive(Debug, Clone, Serialize)]
pub struct VideoChatRequest {
    pub message: String,
    pub video_data: VideoContext,
    pub dialogue_history: Vec<HistoryEntry>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VideoChatResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Multipart fields of `POST /process_video`
#[derive(Debug, Clone)]
pub struct VideoUpload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub title: String,
    pub language: String,
    pub output_type: String,
}

/// Multipart fields of `POST /download`
#[derive(Debug, Clone, PartialEq)]
pub struct DownloadRequest {
    pub content: String,
    pub filename: String,
    pub file_extension: String,
}
