pub mod authoring;
pub mod error;
pub mod feedback;
pub mod models;
pub mod runner;
pub mod scoring;
pub mod services;
pub mod session;

use std::sync::Arc;

pub use error::QuizError;
pub use models::{QuizDefinition, QuizQuestion};
pub use scoring::{score, AnswerSet, QuizResult};
pub use session::{AttemptSnapshot, AttemptStatus, QuizSession};

// Fetches the lesson's quiz, starts an attempt and hands back the
// running countdown, all in one step for the embedding UI.
pub async fn begin_attempt(
    provider: &dyn services::QuizDataProvider,
    completion: Arc<dyn services::LessonCompletionService>,
    course_id: i64,
    lesson_id: i64,
) -> anyhow::Result<runner::SessionRunner> {
    let assignment = provider.fetch_assignment(course_id, lesson_id).await?;
    let mut session = QuizSession::new(assignment, completion);
    session.start()?;
    Ok(runner::SessionRunner::spawn(session))
}
