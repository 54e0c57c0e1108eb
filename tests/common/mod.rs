#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;

use video_tutor_rust::api::models::*;
use video_tutor_rust::{Backend, Result, TutorError};

/// A request the mock backend received
#[derive(Debug, Clone)]
pub enum Call {
    Process(String),
    PracticeQuestions { knowledge_point: String, limit: usize },
    PracticeChat(PracticeChatRequest),
    KnowledgePointChat(KnowledgePointChatRequest),
    VideoChat(VideoChatRequest),
    Download(DownloadRequest),
}

/// In-memory backend replaying scripted replies in order
///
/// `Err(text)` entries become `TutorError::Server(text)`. An empty queue
/// answers with a generic reply.
#[derive(Default)]
pub struct MockBackend {
    process: Mutex<Option<ProcessVideoResponse>>,
    questions: Mutex<VecDeque<std::result::Result<Vec<QuestionRecord>, String>>>,
    practice_replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    knowledge_point_replies: Mutex<VecDeque<std::result::Result<KnowledgePointChatResponse, String>>>,
    video_replies: Mutex<VecDeque<std::result::Result<String, String>>>,
    calls: Mutex<Vec<Call>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_process_response(self, response: ProcessVideoResponse) -> Self {
        *self.process.lock().unwrap() = Some(response);
        self
    }

    pub fn with_questions(self, questions: Vec<QuestionRecord>) -> Self {
        self.questions.lock().unwrap().push_back(Ok(questions));
        self
    }

    pub fn with_question_failure(self, error: &str) -> Self {
        self.questions.lock().unwrap().push_back(Err(error.to_string()));
        self
    }

    pub fn with_practice_reply(self, reply: std::result::Result<&str, &str>) -> Self {
        self.practice_replies
            .lock()
            .unwrap()
            .push_back(reply.map(str::to_string).map_err(str::to_string));
        self
    }

    pub fn with_knowledge_point_reply(self, reply: std::result::Result<KnowledgePointChatResponse, &str>) -> Self {
        self.knowledge_point_replies
            .lock()
            .unwrap()
            .push_back(reply.map_err(str::to_string));
        self
    }

    pub fn with_video_reply(self, reply: std::result::Result<&str, &str>) -> Self {
        self.video_replies
            .lock()
            .unwrap()
            .push_back(reply.map(str::to_string).map_err(str::to_string));
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn practice_chats(&self) -> Vec<PracticeChatRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::PracticeChat(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    pub fn knowledge_point_chats(&self) -> Vec<KnowledgePointChatRequest> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::KnowledgePointChat(request) => Some(request),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

fn scripted<T>(queue: &Mutex<VecDeque<std::result::Result<T, String>>>, fallback: T) -> Result<T> {
    match queue.lock().unwrap().pop_front() {
        Some(Ok(value)) => Ok(value),
        Some(Err(error)) => Err(TutorError::Server(error)),
        None => Ok(fallback),
    }
}

#[async_trait]
impl Backend for MockBackend {
    async fn process_video(&self, upload: VideoUpload) -> Result<ProcessVideoResponse> {
        self.record(Call::Process(upload.title.clone()));
        self.process
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| TutorError::Server("processing failed".to_string()))
    }

    async fn practice_questions(&self, knowledge_point: &str, limit: usize) -> Result<Vec<QuestionRecord>> {
        self.record(Call::PracticeQuestions {
            knowledge_point: knowledge_point.to_string(),
            limit,
        });
        scripted(&self.questions, Vec::new()).map(|mut questions| {
            questions.truncate(limit);
            questions
        })
    }

    async fn chat_for_practice(&self, request: &PracticeChatRequest) -> Result<String> {
        self.record(Call::PracticeChat(request.clone()));
        scripted(&self.practice_replies, "Keep going!".to_string())
    }

    async fn chat_for_knowledge_point(&self, request: &KnowledgePointChatRequest) -> Result<KnowledgePointChatResponse> {
        self.record(Call::KnowledgePointChat(request.clone()));
        scripted(
            &self.knowledge_point_replies,
            KnowledgePointChatResponse {
                success: true,
                response: Some("Let's look at that.".to_string()),
                ..Default::default()
            },
        )
    }

    async fn chat_for_video(&self, request: &VideoChatRequest) -> Result<String> {
        self.record(Call::VideoChat(request.clone()));
        scripted(&self.video_replies, "Here is what the video covers.".to_string())
    }

    async fn download(&self, request: &DownloadRequest) -> Result<Vec<u8>> {
        self.record(Call::Download(request.clone()));
        Ok(request.content.as_bytes().to_vec())
    }
}

/// A question whose correct option is `answer`
pub fn question(title: &str, answer: &str) -> QuestionRecord {
    QuestionRecord {
        title: Some(title.to_string()),
        question_text: Some(format!("{}?", title)),
        option_a: Some("first".to_string()),
        option_b: Some("second".to_string()),
        option_c: Some("third".to_string()),
        option_d: Some("fourth".to_string()),
        answer: Some(answer.to_string()),
        difficulty: Some("Medium".to_string()),
        difficulty_level: Some(2),
        ..Default::default()
    }
}

pub fn questions(count: usize) -> Vec<QuestionRecord> {
    (1..=count).map(|i| question(&format!("Question {}", i), "A")).collect()
}
