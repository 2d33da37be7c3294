use futures::future::BoxFuture;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::models::{validate_definition, QuizDefinition};

#[derive(Debug, Clone)]
pub struct QuizAssignment {
    pub course_id: i64,
    pub lesson_id: i64,
    pub definition: QuizDefinition,
}

pub trait LessonCompletionService: Send + Sync {
    fn mark_complete(&self, course_id: i64, lesson_id: i64) -> BoxFuture<'static, anyhow::Result<()>>;
}

#[derive(Clone, Default)]
pub struct MockCompletionService {
    fail_with: Option<String>,
    calls: Arc<Mutex<Vec<(i64, i64)>>>,
}

impl MockCompletionService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self {
            fail_with: Some(reason.into()),
            calls: Arc::default(),
        }
    }

    pub async fn calls(&self) -> Vec<(i64, i64)> {
        self.calls.lock().await.clone()
    }
}

impl LessonCompletionService for MockCompletionService {
    fn mark_complete(&self, course_id: i64, lesson_id: i64) -> BoxFuture<'static, anyhow::Result<()>> {
        let calls = self.calls.clone();
        let fail_with = self.fail_with.clone();
        Box::pin(async move {
            calls.lock().await.push((course_id, lesson_id));
            if let Some(reason) = fail_with {
                anyhow::bail!("{}", reason);
            }
            Ok(())
        })
    }
}

pub trait QuizDataProvider: Send + Sync {
    fn fetch_assignment(
        &self,
        course_id: i64,
        lesson_id: i64,
    ) -> BoxFuture<'static, anyhow::Result<QuizAssignment>>;
}

#[derive(Debug, Default)]
pub struct InMemoryDataProvider {
    quizzes: HashMap<(i64, i64), QuizDefinition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SeedEntry {
    course_id: i64,
    lesson_id: i64,
    definition: QuizDefinition,
}

impl InMemoryDataProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &mut self,
        course_id: i64,
        lesson_id: i64,
        definition: QuizDefinition,
    ) -> anyhow::Result<()> {
        if let Err(issues) = validate_definition(&definition) {
            let first = &issues[0];
            anyhow::bail!(
                "refusing to serve invalid quiz for course {} lesson {}: {} {}",
                course_id,
                lesson_id,
                first.field,
                first.issue
            );
        }
        self.quizzes.insert((course_id, lesson_id), definition);
        Ok(())
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let entries: Vec<SeedEntry> = serde_json::from_str(raw)?;
        let mut provider = Self::new();
        for entry in entries {
            provider.insert(entry.course_id, entry.lesson_id, entry.definition)?;
        }
        Ok(provider)
    }

    pub fn len(&self) -> usize {
        self.quizzes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quizzes.is_empty()
    }
}

impl QuizDataProvider for InMemoryDataProvider {
    fn fetch_assignment(
        &self,
        course_id: i64,
        lesson_id: i64,
    ) -> BoxFuture<'static, anyhow::Result<QuizAssignment>> {
        let definition = self.quizzes.get(&(course_id, lesson_id)).cloned();
        Box::pin(async move {
            let definition = definition.ok_or_else(|| {
                anyhow::anyhow!("no quiz attached to course {} lesson {}", course_id, lesson_id)
            })?;
            Ok(QuizAssignment {
                course_id,
                lesson_id,
                definition,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: &str = r#"[
        {
            "courseId": 1,
            "lessonId": 10,
            "definition": {
                "questions": [
                    {
                        "id": "q1",
                        "text": "Pick one",
                        "options": ["a", "b"],
                        "correctAnswer": "a"
                    }
                ]
            }
        }
    ]"#;

    #[tokio::test]
    async fn provider_serves_seeded_assignments() {
        let provider = InMemoryDataProvider::from_json(SEED).unwrap();
        assert_eq!(provider.len(), 1);

        let assignment = provider.fetch_assignment(1, 10).await.unwrap();
        assert_eq!(assignment.course_id, 1);
        assert_eq!(assignment.lesson_id, 10);
        assert_eq!(assignment.definition.questions.len(), 1);

        let missing = provider.fetch_assignment(1, 99).await;
        assert!(missing.is_err());
    }

    #[test]
    fn provider_rejects_invalid_definitions() {
        let mut provider = InMemoryDataProvider::new();
        let mut definition =
            QuizDefinition::from_json_str(r#"{"questions":[{"id":"q1","text":"Q","options":["a","b"],"correctAnswer":"a"}]}"#)
                .unwrap();
        definition.questions[0].correct_answer = "zzz".into();
        let err = provider.insert(1, 1, definition).unwrap_err();
        assert!(err.to_string().contains("correctAnswer"));
        assert!(provider.is_empty());
    }

    #[tokio::test]
    async fn mock_completion_records_calls_and_can_fail() {
        let ok = MockCompletionService::new();
        ok.mark_complete(1, 2).await.unwrap();
        assert_eq!(ok.calls().await, vec![(1, 2)]);

        let failing = MockCompletionService::failing("backend down");
        let err = failing.mark_complete(3, 4).await.unwrap_err();
        assert!(err.to_string().contains("backend down"));
        assert_eq!(failing.calls().await, vec![(3, 4)]);
    }
}
