mod common;

use common::{questions, Call, MockBackend};
use serde_json::json;
use std::sync::Arc;
use tempfile::TempDir;

use video_tutor_rust::api::models::{ProcessVideoResponse, VideoUpload};
use video_tutor_rust::config::ConfigBuilder;
use video_tutor_rust::knowledge::IndexSource;
use video_tutor_rust::{Config, ExportKind, Exporter, MediaElement, Phase, ReadyState, VideoWorkspace};

struct Player {
    state: ReadyState,
    time: f64,
    paused: bool,
}

impl MediaElement for Player {
    fn ready_state(&self) -> ReadyState {
        self.state
    }
    fn current_time(&self) -> f64 {
        self.time
    }
    fn duration(&self) -> Option<f64> {
        Some(120.0)
    }
    fn is_paused(&self) -> bool {
        self.paused
    }
    fn seek(&mut self, seconds: f64) {
        self.time = seconds;
    }
    fn play(&mut self) {
        self.paused = false;
    }
    fn pause(&mut self) {
        self.paused = true;
    }
}

fn legacy_response() -> ProcessVideoResponse {
    serde_json::from_value(json!({
        "success": true,
        "analysis": {
            "summary": "See [00:00:40-00:00:55] for the chain rule.",
            "content_segments": [
                { "concept": "Limits", "start_time": "00:00:00", "end_time": "00:00:30" },
                { "concept": "Chain Rule", "start_time": "00:00:40", "end_time": "00:01:10" }
            ]
        },
        "knowledge_points": [
            { "title": "Derivatives", "start_seconds": 0, "end_seconds": 10 },
            { "title": "Integrals", "start_seconds": 20, "end_seconds": 30 }
        ],
        "timestamp_mapping": {
            "Derivatives": { "start_time": "00:00:00", "end_time": "00:00:10", "description": "slopes" }
        }
    }))
    .unwrap()
}

fn upload(title: &str) -> VideoUpload {
    VideoUpload {
        file_name: "lecture.mp4".to_string(),
        bytes: vec![0; 16],
        title: title.to_string(),
        language: "English".to_string(),
        output_type: "analysis".to_string(),
    }
}

#[tokio::test]
async fn test_process_builds_registry_from_preferred_shape() {
    let backend = Arc::new(MockBackend::new().with_process_response(legacy_response()));
    let mut workspace = VideoWorkspace::new(backend.clone(), &Config::default());

    let registry = workspace.process(upload("Calculus")).await.unwrap();

    let titles: Vec<&str> = registry.points().iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Derivatives", "Integrals"]);
    assert_eq!(registry.index_source(), IndexSource::TimestampMapping);
    assert_eq!(workspace.summary(), "See [00:00:40-00:00:55] for the chain rule.");
    assert!(matches!(&backend.calls()[0], Call::Process(title) if title == "Calculus"));
}

#[tokio::test]
async fn test_failed_processing_keeps_previous_registry() {
    let backend = Arc::new(MockBackend::new());
    let mut workspace = VideoWorkspace::new(backend, &Config::default());
    workspace.apply_response("Calculus", &legacy_response());

    assert!(workspace.process(upload("Other")).await.is_err());
    assert_eq!(workspace.registry().len(), 2);
    assert_eq!(workspace.title(), "Calculus");
}

#[tokio::test]
async fn test_playback_drives_highlight() {
    let backend = Arc::new(MockBackend::new());
    let mut workspace = VideoWorkspace::new(backend, &Config::default());
    workspace.apply_response("Calculus", &legacy_response());

    assert_eq!(workspace.on_time_update(5.0).unwrap().current, 0);
    assert!(workspace.on_time_update(9.0).is_none());
    assert_eq!(workspace.on_time_update(25.0).unwrap().current, 1);

    let mut player = Player {
        state: ReadyState::HaveNothing,
        time: 25.0,
        paused: true,
    };
    assert!(!workspace.jump_to_title(&mut player, "Derivatives"));
    assert_eq!(player.time, 25.0);

    player.state = ReadyState::HaveCurrentData;
    assert!(workspace.jump_to_title(&mut player, "Derivatives"));
    assert_eq!(player.time, 0.0);
    assert!(!player.paused);
    assert_eq!(workspace.tracker().active(), Some(0));
}

#[tokio::test]
async fn test_video_chat_carries_playback_context() {
    let backend = Arc::new(MockBackend::new().with_video_reply(Ok("It covers limits first.")));
    let mut workspace = VideoWorkspace::new(backend.clone(), &Config::default());
    workspace.apply_response("Calculus", &legacy_response());

    let player = Player {
        state: ReadyState::HaveEnoughData,
        time: 42.0,
        paused: false,
    };
    let reply = workspace.send_chat(&player, "What comes first?").await.unwrap();
    assert_eq!(reply.content, "It covers limits first.");

    let request = backend
        .calls()
        .into_iter()
        .find_map(|call| match call {
            Call::VideoChat(request) => Some(request),
            _ => None,
        })
        .unwrap();
    assert_eq!(request.video_data.title, "Calculus");
    assert_eq!(request.video_data.current_time, 42.0);
    assert_eq!(request.video_data.duration, 120.0);
    assert_eq!(request.video_data.knowledge_points.len(), 2);
}

#[tokio::test]
async fn test_practice_from_workspace_uses_config_limit() {
    let backend = Arc::new(MockBackend::new().with_questions(questions(10)));
    let config = ConfigBuilder::new().with_question_limit(3).build();
    let workspace = VideoWorkspace::new(backend.clone(), &config);

    let mut driver = workspace.practice("Integrals");
    assert_eq!(driver.open().await.unwrap(), &Phase::QuestionActive);
    assert_eq!(driver.session().total(), 3);
    assert!(matches!(
        &backend.calls()[0],
        Call::PracticeQuestions { knowledge_point, limit: 3 } if knowledge_point == "Integrals"
    ));
}

#[tokio::test]
async fn test_export_timestamps_to_download_dir() {
    let temp_dir = TempDir::new().unwrap();
    let backend = Arc::new(MockBackend::new());
    let mut workspace = VideoWorkspace::new(backend.clone(), &Config::default());
    workspace.apply_response("Calculus", &legacy_response());

    let content = ExportKind::Timestamps
        .content(&workspace.registry(), workspace.summary())
        .unwrap();
    let exporter = Exporter::new(backend.clone(), temp_dir.path().join("downloads"));
    let path = exporter.export(ExportKind::Timestamps, "Calculus", content).await.unwrap();

    assert_eq!(path.file_name().unwrap(), "Calculus_timestamps.txt");
    let written = tokio::fs::read_to_string(&path).await.unwrap();
    assert_eq!(written, "00:00:00 - Derivatives\n00:00:20 - Integrals");

    assert!(matches!(
        &backend.calls()[0],
        Call::Download(request) if request.file_extension == ".txt" && request.filename == "Calculus_timestamps"
    ));
}
