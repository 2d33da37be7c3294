use chrono::{DateTime, Utc};
use rand::seq::SliceRandom;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::QuizError;
use crate::models::QuizDefinition;
use crate::scoring::{score, AnswerSet, QuizResult};
use crate::services::{LessonCompletionService, QuizAssignment};

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum AttemptStatus {
    NotStarted,
    InProgress,
    Submitted,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    Running { remaining_seconds: u32 },
    AutoSubmitted(QuizResult),
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttemptSnapshot {
    pub attempt_id: Uuid,
    pub course_id: i64,
    pub lesson_id: i64,
    pub status: AttemptStatus,
    pub current_question_index: usize,
    pub remaining_seconds: u32,
    pub answered_count: usize,
    pub total_questions: usize,
    pub answers: HashMap<usize, String>,
}

pub struct QuizSession {
    attempt_id: Uuid,
    course_id: i64,
    lesson_id: i64,
    definition: Arc<QuizDefinition>,
    completion: Arc<dyn LessonCompletionService>,
    status: AttemptStatus,
    current_question_index: usize,
    answers: HashMap<usize, String>,
    remaining_seconds: u32,
    presentation_order: Vec<usize>,
    started_at: Option<DateTime<Utc>>,
    submitted_at: Option<DateTime<Utc>>,
    result: Option<QuizResult>,
    completion_outcome: Option<Result<(), QuizError>>,
}

impl QuizSession {
    // The assignment's definition is trusted here: it passed the
    // authoring validator (or the provider edge) before being handed out.
    pub fn new(assignment: QuizAssignment, completion: Arc<dyn LessonCompletionService>) -> Self {
        debug_assert!(!assignment.definition.questions.is_empty());
        let question_count = assignment.definition.questions.len();
        Self {
            attempt_id: Uuid::new_v4(),
            course_id: assignment.course_id,
            lesson_id: assignment.lesson_id,
            definition: Arc::new(assignment.definition),
            completion,
            status: AttemptStatus::NotStarted,
            current_question_index: 0,
            answers: HashMap::new(),
            remaining_seconds: 0,
            presentation_order: (0..question_count).collect(),
            started_at: None,
            submitted_at: None,
            result: None,
            completion_outcome: None,
        }
    }

    pub fn start(&mut self) -> Result<(), QuizError> {
        if self.status != AttemptStatus::NotStarted {
            return Err(QuizError::InvalidTransition {
                operation: "start",
                status: self.status,
            });
        }
        self.status = AttemptStatus::InProgress;
        self.current_question_index = 0;
        self.answers.clear();
        self.remaining_seconds = self.definition.time_limit_seconds;
        self.started_at = Some(Utc::now());
        if self.definition.randomize_questions {
            self.presentation_order.shuffle(&mut rand::thread_rng());
        }
        info!(
            "attempt {} started for course {} lesson {} ({} questions, {}s)",
            self.attempt_id,
            self.course_id,
            self.lesson_id,
            self.definition.questions.len(),
            self.remaining_seconds
        );
        Ok(())
    }

    pub fn select_answer(&mut self, question_index: usize, option: &str) -> Result<(), QuizError> {
        if self.status != AttemptStatus::InProgress {
            return Err(QuizError::InvalidTransition {
                operation: "select_answer",
                status: self.status,
            });
        }
        let is_option = self
            .definition
            .questions
            .get(question_index)
            .map(|q| q.options.iter().any(|o| o == option))
            .unwrap_or(false);
        if !is_option {
            return Err(QuizError::InvalidAnswerOption {
                question_index,
                selected: option.to_string(),
            });
        }
        // Last write wins; the learner may change their mind until submit.
        self.answers.insert(question_index, option.to_string());
        Ok(())
    }

    pub fn go_to_question(&mut self, index: usize) -> Result<usize, QuizError> {
        if self.status != AttemptStatus::InProgress {
            return Err(QuizError::InvalidTransition {
                operation: "go_to_question",
                status: self.status,
            });
        }
        let clamped = index.min(self.definition.questions.len() - 1);
        self.current_question_index = clamped;
        Ok(clamped)
    }

    pub async fn tick(&mut self) -> Result<Tick, QuizError> {
        if self.status != AttemptStatus::InProgress {
            return Err(QuizError::InvalidTransition {
                operation: "tick",
                status: self.status,
            });
        }
        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            let result = self.finish(true).await;
            return Ok(Tick::AutoSubmitted(result));
        }
        Ok(Tick::Running {
            remaining_seconds: self.remaining_seconds,
        })
    }

    pub async fn submit(&mut self) -> Result<QuizResult, QuizError> {
        if self.status != AttemptStatus::InProgress {
            return Err(QuizError::InvalidTransition {
                operation: "submit",
                status: self.status,
            });
        }
        Ok(self.finish(false).await)
    }

    // The single grading path; runs exactly once per attempt. The state
    // flips to Submitted before the completion call so a slow or failing
    // collaborator can never undo or repeat the grading.
    async fn finish(&mut self, auto: bool) -> QuizResult {
        let answers = AnswerSet::from_sparse(self.definition.questions.len(), &self.answers);
        let result = score(&self.definition, &answers);
        self.status = AttemptStatus::Submitted;
        self.submitted_at = Some(Utc::now());
        self.result = Some(result.clone());
        info!(
            "attempt {} submitted{}: {}/{} ({:.1}%), passed={}",
            self.attempt_id,
            if auto { " by timeout" } else { "" },
            result.raw_score,
            result.max_score,
            result.percentage,
            result.passed
        );

        if result.passed {
            match self
                .completion
                .mark_complete(self.course_id, self.lesson_id)
                .await
            {
                Ok(()) => {
                    self.completion_outcome = Some(Ok(()));
                }
                Err(err) => {
                    // Non-fatal: the learner keeps their result either way.
                    warn!(
                        "attempt {} passed but marking lesson {} complete failed: {}",
                        self.attempt_id, self.lesson_id, err
                    );
                    self.completion_outcome = Some(Err(QuizError::CompletionServiceFailure {
                        course_id: self.course_id,
                        lesson_id: self.lesson_id,
                        reason: err.to_string(),
                    }));
                }
            }
        }
        result
    }

    pub fn attempt_id(&self) -> Uuid {
        self.attempt_id
    }

    pub fn course_id(&self) -> i64 {
        self.course_id
    }

    pub fn lesson_id(&self) -> i64 {
        self.lesson_id
    }

    pub fn definition(&self) -> &QuizDefinition {
        &self.definition
    }

    pub fn status(&self) -> AttemptStatus {
        self.status
    }

    pub fn remaining_seconds(&self) -> u32 {
        self.remaining_seconds
    }

    pub fn current_question_index(&self) -> usize {
        self.current_question_index
    }

    pub fn presentation_order(&self) -> &[usize] {
        &self.presentation_order
    }

    pub fn selected_answer(&self, question_index: usize) -> Option<&str> {
        self.answers.get(&question_index).map(|s| s.as_str())
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn time_taken_seconds(&self) -> u32 {
        self.definition
            .time_limit_seconds
            .saturating_sub(self.remaining_seconds)
    }

    pub fn result(&self) -> Option<&QuizResult> {
        self.result.as_ref()
    }

    // What the review screen may show: definitions that hide the answer
    // key get the redacted copy.
    pub fn result_for_review(&self) -> Option<QuizResult> {
        self.result.as_ref().map(|r| {
            if self.definition.show_correct_answers {
                r.clone()
            } else {
                r.redacted()
            }
        })
    }

    pub fn completion_outcome(&self) -> Option<&Result<(), QuizError>> {
        self.completion_outcome.as_ref()
    }

    pub fn snapshot(&self) -> AttemptSnapshot {
        AttemptSnapshot {
            attempt_id: self.attempt_id,
            course_id: self.course_id,
            lesson_id: self.lesson_id,
            status: self.status,
            current_question_index: self.current_question_index,
            remaining_seconds: self.remaining_seconds,
            answered_count: self.answers.len(),
            total_questions: self.definition.questions.len(),
            answers: self.answers.clone(),
        }
    }
}
