mod common;

use common::{questions, MockBackend};
use std::sync::Arc;
use std::time::Duration;

use video_tutor_rust::dialogue::Role;
use video_tutor_rust::practice::messages;
use video_tutor_rust::{Config, Phase, PracticeDriver, SubmitOutcome, TutorError};

fn driver(backend: &Arc<MockBackend>, knowledge_point: &str) -> PracticeDriver {
    PracticeDriver::new(backend.clone(), knowledge_point, &Config::default())
}

#[tokio::test]
async fn test_open_loads_first_question() {
    let backend = Arc::new(MockBackend::new().with_questions(questions(7)));
    let mut driver = driver(&backend, "Derivatives");

    assert_eq!(driver.open().await.unwrap(), &Phase::QuestionActive);
    assert_eq!(driver.session().total(), 5);
    assert_eq!(driver.current_question().unwrap().title, "Question 1");
    assert_eq!(driver.current_question().unwrap().difficulty_label(), "Level 2 (Medium)");
}

#[tokio::test]
async fn test_empty_session_shows_no_questions() {
    let backend = Arc::new(MockBackend::new().with_questions(Vec::new()));
    let mut driver = driver(&backend, "Derivatives");

    assert_eq!(driver.open().await.unwrap(), &Phase::NoQuestions);
    assert_eq!(driver.transcript().last().unwrap().role, Role::Notice);
}

#[tokio::test]
async fn test_load_error_then_retry() {
    let backend = Arc::new(
        MockBackend::new()
            .with_question_failure("database offline")
            .with_questions(questions(2)),
    );
    let mut driver = driver(&backend, "Derivatives");

    assert!(driver.open().await.is_err());
    assert!(matches!(driver.phase(), Phase::LoadError(_)));

    assert_eq!(driver.retry().await.unwrap(), &Phase::QuestionActive);
}

#[tokio::test]
async fn test_submit_without_selection_gives_guidance() {
    let backend = Arc::new(MockBackend::new().with_questions(questions(2)));
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();

    assert!(matches!(driver.submit().await, Err(TutorError::NoSelection)));
    let last = driver.transcript().last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert_eq!(last.content, messages::SELECT_FIRST);
    assert_eq!(driver.session().cursor(), 0);
}

#[tokio::test]
async fn test_three_wrong_answers_request_exactly_one_hint() {
    let backend = Arc::new(
        MockBackend::new()
            .with_questions(questions(3))
            .with_practice_reply(Ok("Think about the slope.")),
    );
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();
    driver.select('B').unwrap();

    assert_eq!(driver.submit().await.unwrap(), SubmitOutcome::Wrong { attempts_left: 2 });
    assert_eq!(driver.submit().await.unwrap(), SubmitOutcome::Wrong { attempts_left: 1 });
    assert!(backend.practice_chats().is_empty());

    assert_eq!(
        driver.submit().await.unwrap(),
        SubmitOutcome::HintRequested { wrong_attempts: 3 }
    );

    let hints = backend.practice_chats();
    assert_eq!(hints.len(), 1);
    assert_eq!(hints[0].user_message, messages::HINT_PROMPT);
    assert_eq!(hints[0].knowledge_point, "Derivatives");
    assert_eq!(hints[0].question.as_ref().unwrap().title.as_deref(), Some("Question 1"));

    let contents: Vec<&str> = driver
        .transcript()
        .entries()
        .iter()
        .map(|e| e.content.as_str())
        .collect();
    assert!(contents.contains(&messages::HINT_INTRO));
    assert_eq!(contents.last(), Some(&"Think about the slope."));
    assert!(!contents.contains(&messages::HINT_PROMPT));
    assert_eq!(driver.session().cursor(), 0);
}

#[tokio::test]
async fn test_hint_escalates_on_every_later_wrong_answer() {
    let backend = Arc::new(MockBackend::new().with_questions(questions(2)));
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();
    driver.select('C').unwrap();

    for _ in 0..5 {
        driver.submit().await.unwrap();
    }
    assert_eq!(backend.practice_chats().len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_correct_after_two_wrong_still_auto_advances() {
    let backend = Arc::new(MockBackend::new().with_questions(questions(3)));
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();

    driver.select('B').unwrap();
    driver.submit().await.unwrap();
    driver.submit().await.unwrap();
    assert_eq!(driver.session().wrong_attempts(), 2);

    driver.select('A').unwrap();
    assert_eq!(driver.submit().await.unwrap(), SubmitOutcome::Correct);
    assert_eq!(driver.transcript().last().unwrap().content, messages::CORRECT);
    assert!(driver.advance_pending());
    assert_eq!(driver.session().cursor(), 0);

    let started = tokio::time::Instant::now();
    assert!(driver.await_auto_advance().await);
    assert!(started.elapsed() >= Duration::from_secs(2));

    assert_eq!(driver.session().cursor(), 1);
    assert_eq!(driver.session().wrong_attempts(), 0);
    assert_eq!(driver.transcript().last().unwrap().content, messages::LOADING_NEXT);
    assert!(backend.practice_chats().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_skip_cancels_pending_advance() {
    let backend = Arc::new(MockBackend::new().with_questions(questions(3)));
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();

    driver.select('A').unwrap();
    driver.submit().await.unwrap();
    driver.skip().unwrap();
    assert_eq!(driver.session().cursor(), 1);

    tokio::time::sleep(Duration::from_secs(5)).await;
    assert!(!driver.await_auto_advance().await);
    assert_eq!(driver.session().cursor(), 1);
}

#[tokio::test]
async fn test_stale_auto_advance_is_ignored() {
    let backend = Arc::new(MockBackend::new().with_questions(questions(3)));
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();

    let stale = video_tutor_rust::practice::PracticeEvent::AutoAdvance {
        generation: driver.session().generation() + 7,
    };
    assert!(!driver.handle_event(stale));
    assert_eq!(driver.session().cursor(), 0);
}

#[tokio::test]
async fn test_skip_on_last_question_completes_with_summary() {
    let backend = Arc::new(MockBackend::new().with_questions(questions(5)));
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();

    for _ in 0..4 {
        assert_eq!(driver.skip().unwrap(), &Phase::QuestionActive);
    }
    assert_eq!(driver.skip().unwrap(), &Phase::Complete);

    let summary = &driver.transcript().last().unwrap().content;
    assert!(summary.contains('5'));
    assert!(summary.contains("Derivatives"));
    assert_eq!(driver.session().total(), 5);
    assert!(driver.current_question().is_none());
}

#[tokio::test(start_paused = true)]
async fn test_close_cancels_timer_and_rejects_input() {
    let backend = Arc::new(MockBackend::new().with_questions(questions(2)));
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();

    driver.select('A').unwrap();
    driver.submit().await.unwrap();
    driver.close();

    assert!(!driver.advance_pending());
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(driver.session().cursor(), 0);
    assert!(matches!(driver.select('A'), Err(TutorError::SessionClosed)));
    assert!(matches!(driver.send_message("hi").await, Err(TutorError::SessionClosed)));
}

#[tokio::test]
async fn test_practice_chat_and_regenerate() {
    let backend = Arc::new(
        MockBackend::new()
            .with_questions(questions(2))
            .with_practice_reply(Ok("Derivatives measure change."))
            .with_practice_reply(Err("model overloaded"))
            .with_practice_reply(Ok("A derivative is a rate.")),
    );
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();

    let reply = driver.send_message("What is a derivative?").await.unwrap();
    assert_eq!(reply.content, "Derivatives measure change.");

    assert!(driver.regenerate(reply.index).await.is_err());
    assert_eq!(
        driver.transcript().last().unwrap().content,
        "Regeneration failed: Backend reported failure: model overloaded"
    );

    let again = driver.regenerate(reply.index).await.unwrap();
    assert_eq!(again.index, reply.index);
    assert_eq!(
        driver.transcript().get(reply.index).unwrap().content,
        "A derivative is a rate."
    );
}

#[tokio::test]
async fn test_chat_after_completion_keeps_last_question() {
    let backend = Arc::new(
        MockBackend::new()
            .with_questions(questions(1))
            .with_practice_reply(Ok("Review the power rule.")),
    );
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();

    assert_eq!(driver.skip().unwrap(), &Phase::Complete);
    driver.send_message("What should I review?").await.unwrap();

    let chats = backend.practice_chats();
    assert_eq!(chats.len(), 1);
    let question = chats[0].question.as_ref();
    assert!(question.is_some());
    assert_eq!(question.unwrap().title.as_deref(), Some("Question 1"));
}

#[tokio::test(start_paused = true)]
async fn test_answered_question_ignores_further_submissions() {
    let backend = Arc::new(MockBackend::new().with_questions(questions(3)));
    let mut driver = driver(&backend, "Derivatives");
    driver.open().await.unwrap();

    driver.select('A').unwrap();
    assert_eq!(driver.submit().await.unwrap(), SubmitOutcome::Correct);

    assert!(matches!(driver.select('B'), Err(TutorError::AlreadyAnswered)));
    for _ in 0..3 {
        assert!(matches!(driver.submit().await, Err(TutorError::AlreadyAnswered)));
    }
    assert_eq!(driver.transcript().last().unwrap().content, messages::ALREADY_ANSWERED);
    assert_eq!(driver.session().wrong_attempts(), 0);
    assert!(backend.practice_chats().is_empty());

    assert!(driver.await_auto_advance().await);
    assert_eq!(driver.session().cursor(), 1);
    driver.select('B').unwrap();
    assert_eq!(driver.submit().await.unwrap(), SubmitOutcome::Wrong { attempts_left: 2 });
}
