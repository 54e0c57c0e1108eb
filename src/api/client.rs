use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};
use url::Url;

use super::models::*;
use super::Backend;
use crate::config::BackendConfig;
use crate::error::{Result, TutorError};

/// HTTP implementation of [`Backend`]
#[derive(Debug, Clone)]
pub struct HttpBackend {
    base_url: Url,
    client: reqwest::Client,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let mut base_url = Url::parse(&config.base_url)?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let mut builder = reqwest::Client::builder();
        if let Some(seconds) = config.request_timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build()?;

        info!("🌐 Backend client targeting {}", base_url);
        Ok(Self { base_url, client })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Resolve an endpoint path against the base URL
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    /// URL of the practice session endpoint with the title as one path segment
    pub fn practice_session_url(&self, knowledge_point: &str, limit: usize) -> Result<Url> {
        let path = format!(
            "get_practice_session/{}?limit={}",
            urlencoding::encode(knowledge_point),
            limit
        );
        self.endpoint(&path)
    }

    async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TutorError::Status {
                status: status.as_u16(),
                body,
            });
        }
        Ok(response.json().await?)
    }
}

fn failure(error: Option<String>, fallback: &str) -> TutorError {
    TutorError::Server(error.filter(|e| !e.is_empty()).unwrap_or_else(|| fallback.to_string()))
}

#[async_trait]
impl Backend for HttpBackend {
    async fn process_video(&self, upload: VideoUpload) -> Result<ProcessVideoResponse> {
        let url = self.endpoint("process_video")?;
        info!("📤 Uploading {} ({} bytes) for processing", upload.file_name, upload.bytes.len());

        let form = Form::new()
            .part("video_file", Part::bytes(upload.bytes).file_name(upload.file_name))
            .text("title", upload.title)
            .text("language", upload.language)
            .text("output_type", upload.output_type);

        let response = self.client.post(url).multipart(form).send().await?;
        let result: ProcessVideoResponse = Self::read_json(response).await?;

        if !result.success {
            return Err(failure(result.error, "Processing failed"));
        }
        Ok(result)
    }

    async fn practice_questions(&self, knowledge_point: &str, limit: usize) -> Result<Vec<QuestionRecord>> {
        let url = self.practice_session_url(knowledge_point, limit)?;
        debug!("Fetching practice session from {}", url);

        let response = self.client.get(url).send().await?;
        let result: PracticeSessionResponse = Self::read_json(response).await?;

        if !result.success {
            return Err(failure(result.error, "Failed to load questions"));
        }
        Ok(result.session.map(|s| s.questions).unwrap_or_default())
    }

    async fn chat_for_practice(&self, request: &PracticeChatRequest) -> Result<String> {
        let url = self.endpoint("chat_for_practice")?;
        debug!("Sending practice chat for {}", request.knowledge_point);

        let response = self.client.post(url).json(request).send().await?;
        let result: PracticeChatResponse = Self::read_json(response).await?;

        match (result.success, result.llm_response) {
            (true, Some(reply)) => Ok(reply),
            (_, _) => Err(failure(result.error, "Practice tutor did not reply")),
        }
    }

    async fn chat_for_knowledge_point(&self, request: &KnowledgePointChatRequest) -> Result<KnowledgePointChatResponse> {
        let url = self.endpoint("chat_for_knowledge_point")?;
        debug!("Sending knowledge point chat for {}", request.knowledge_point_data.title);

        let response = self.client.post(url).json(request).send().await?;
        let result: KnowledgePointChatResponse = Self::read_json(response).await?;

        if !result.success || result.response.is_none() {
            return Err(failure(result.error, "Knowledge point tutor did not reply"));
        }
        Ok(result)
    }

    async fn chat_for_video(&self, request: &VideoChatRequest) -> Result<String> {
        let url = self.endpoint("chat_for_video")?;
        debug!("Sending video chat for {}", request.video_data.title);

        let response = self.client.post(url).json(request).send().await?;
        let result: VideoChatResponse = Self::read_json(response).await?;

        // This endpoint historically omits `success`; only an explicit false is a failure
        if result.success == Some(false) {
            return Err(failure(result.error, "Video tutor did not reply"));
        }
        result
            .response
            .ok_or_else(|| failure(result.error, "Video tutor did not reply"))
    }

    async fn download(&self, request: &DownloadRequest) -> Result<Vec<u8>> {
        let url = self.endpoint("download")?;

        let form = Form::new()
            .text("content", request.content.clone())
            .text("filename", request.filename.clone())
            .text("file_extension", request.file_extension.clone());

        let response = self.client.post(url).multipart(form).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!("Download of {}{} failed with {}", request.filename, request.file_extension, status);
            return Err(TutorError::Status {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response.bytes().await?.to_vec())
    }
}
