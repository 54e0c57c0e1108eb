//! Fixed lines the practice dialog writes into its transcript

pub const SELECT_FIRST: &str = "Please select an answer first, then submit.";
pub const CORRECT: &str = "✅ You are correct! Great job!";
pub const HINT_INTRO: &str =
    "🤔 This question seems a bit challenging. Don't worry, I'll let the AI teacher give you a hint.";
pub const HINT_PROMPT: &str = "I have answered this question incorrectly 3 times in a row. Please give me a guiding hint, but do not tell me the correct answer directly.";
pub const ALREADY_ANSWERED: &str = "You already answered this one correctly. The next question is on its way.";
pub const LOADING_NEXT: &str = "Loading next question...";
pub const NO_QUESTIONS: &str =
    "No related questions. There are no matching practice questions for the current knowledge point.";
pub const LOAD_FAILED: &str = "Failed to load questions";

pub fn selected_answer(letter: char) -> String {
    format!("I selected answer: {}", letter)
}

pub fn wrong_answer(attempts_left: u32) -> String {
    format!(
        "❌ The answer is incorrect. Please think again. You have {} more attempts 😉",
        attempts_left
    )
}

/// Closing summary once every question has been shown
pub fn summary(total_questions: usize, knowledge_point: &str) -> String {
    format!(
        "📊 Practice summary:\n• Total questions: {}\n• Knowledge point: {}\n• Suggestion: Continue to strengthen related knowledge points",
        total_questions, knowledge_point
    )
}
