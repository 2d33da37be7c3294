use thiserror::Error;

use crate::session::AttemptStatus;

#[derive(Debug, Clone, Error)]
pub enum QuizError {
    #[error("`{operation}` is not allowed while the attempt is {status:?}")]
    InvalidTransition {
        operation: &'static str,
        status: AttemptStatus,
    },
    #[error("`{selected}` is not an option of question {question_index}")]
    InvalidAnswerOption {
        question_index: usize,
        selected: String,
    },
    #[error("no usable questions remain after filtering the drafts")]
    EmptyQuizDefinition,
    #[error("failed to mark lesson {lesson_id} of course {course_id} complete: {reason}")]
    CompletionServiceFailure {
        course_id: i64,
        lesson_id: i64,
        reason: String,
    },
}
