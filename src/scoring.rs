use serde::Serialize;
use std::collections::HashMap;

use crate::models::QuizDefinition;

#[derive(Debug, Clone, PartialEq)]
pub struct AnswerSet(Vec<Option<String>>);

impl AnswerSet {
    pub fn empty(question_count: usize) -> Self {
        Self(vec![None; question_count])
    }

    // Densifies the session's sparse index map: every unanswered
    // question becomes an explicit `None` entry.
    pub fn from_sparse(question_count: usize, selected: &HashMap<usize, String>) -> Self {
        let mut answers = vec![None; question_count];
        for (index, option) in selected {
            if let Some(slot) = answers.get_mut(*index) {
                *slot = Some(option.clone());
            }
        }
        Self(answers)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn answered_count(&self) -> usize {
        self.0.iter().filter(|a| a.is_some()).count()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.0.get(index).and_then(|a| a.as_deref())
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PerQuestionResult {
    pub question_id: String,
    pub question_text: String,
    pub selected: Option<String>,
    pub correct_answer: Option<String>,
    pub is_correct: bool,
    pub explanation: Option<String>,
    pub topic: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub raw_score: u32,
    pub max_score: u32,
    pub percentage: f64,
    pub passed: bool,
    pub per_question: Vec<PerQuestionResult>,
}

impl QuizResult {
    // Review copy for definitions that hide the answer key.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        for entry in &mut copy.per_question {
            entry.correct_answer = None;
            entry.explanation = None;
        }
        copy
    }
}

pub fn score(definition: &QuizDefinition, answers: &AnswerSet) -> QuizResult {
    // Zero-question definitions are rejected upstream by the authoring
    // validator, so this is a precondition rather than a branch.
    debug_assert!(!definition.questions.is_empty());
    debug_assert_eq!(answers.len(), definition.questions.len());

    let mut raw_score = 0u32;
    let mut per_question = Vec::with_capacity(definition.questions.len());

    for (i, question) in definition.questions.iter().enumerate() {
        let selected = answers.get(i);
        let is_correct = selected == Some(question.correct_answer.as_str());
        if is_correct {
            raw_score += 1;
        }
        per_question.push(PerQuestionResult {
            question_id: question.id.clone(),
            question_text: question.text.clone(),
            selected: selected.map(|s| s.to_string()),
            correct_answer: Some(question.correct_answer.clone()),
            is_correct,
            explanation: question.explanation.clone(),
            topic: question.topic.clone(),
        });
    }

    let max_score = definition.questions.len() as u32;
    let percentage = f64::from(raw_score) * 100.0 / f64::from(max_score);
    QuizResult {
        raw_score,
        max_score,
        percentage,
        passed: percentage >= f64::from(definition.passing_score_percent),
        per_question,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuizQuestion;

    fn question(id: &str, text: &str, correct: &str, wrong: &str) -> QuizQuestion {
        QuizQuestion {
            id: id.into(),
            text: text.into(),
            options: vec![correct.into(), wrong.into()],
            correct_answer: correct.into(),
            explanation: None,
            topic: None,
            points: 1,
        }
    }

    fn three_question_definition() -> QuizDefinition {
        QuizDefinition {
            time_limit_seconds: 60,
            passing_score_percent: 70,
            attempts_allowed: 3,
            randomize_questions: false,
            show_correct_answers: true,
            questions: vec![
                question("q1", "First", "a", "b"),
                question("q2", "Second", "c", "d"),
                question("q3", "Third", "e", "f"),
            ],
        }
    }

    #[test]
    fn scoring_is_deterministic() {
        let definition = three_question_definition();
        let answers = AnswerSet::from_sparse(
            3,
            &HashMap::from([(0, "a".to_string()), (2, "f".to_string())]),
        );
        let first = score(&definition, &answers);
        let second = score(&definition, &answers);
        assert_eq!(first, second);
    }

    #[test]
    fn unanswered_questions_count_as_wrong() {
        let definition = three_question_definition();
        let answers = AnswerSet::from_sparse(3, &HashMap::from([(0, "a".to_string())]));
        let result = score(&definition, &answers);
        assert_eq!(result.raw_score, 1);
        assert_eq!(result.max_score, 3);
        assert!((result.percentage - 100.0 / 3.0).abs() < 1e-9);
        assert!(!result.passed);
        assert_eq!(result.per_question[1].selected, None);
        assert!(!result.per_question[1].is_correct);
    }

    #[test]
    fn score_stays_within_bounds() {
        let definition = three_question_definition();
        let empty = score(&definition, &AnswerSet::empty(3));
        assert_eq!(empty.raw_score, 0);
        assert_eq!(empty.percentage, 0.0);

        let all = AnswerSet::from_sparse(
            3,
            &HashMap::from([
                (0, "a".to_string()),
                (1, "c".to_string()),
                (2, "e".to_string()),
            ]),
        );
        let full = score(&definition, &all);
        assert_eq!(full.raw_score, full.max_score);
        assert_eq!(full.percentage, 100.0);
        assert!(full.passed);
    }

    #[test]
    fn passing_is_inclusive_at_the_threshold() {
        let mut definition = three_question_definition();
        definition.passing_score_percent = 70;
        definition.questions = (0..10)
            .map(|i| question(&format!("q{i}"), "Q", "yes", "no"))
            .collect();
        let answers = AnswerSet::from_sparse(
            10,
            &(0..7).map(|i| (i, "yes".to_string())).collect(),
        );
        let result = score(&definition, &answers);
        assert_eq!(result.percentage, 70.0);
        assert!(result.passed);
    }

    #[test]
    fn grading_uses_exact_string_equality() {
        let definition = three_question_definition();
        let answers = AnswerSet::from_sparse(3, &HashMap::from([(0, "A".to_string())]));
        let result = score(&definition, &answers);
        assert_eq!(result.raw_score, 0);
    }

    #[test]
    fn redacted_result_hides_the_answer_key() {
        let mut definition = three_question_definition();
        definition.questions[0].explanation = Some("because".into());
        let result = score(
            &definition,
            &AnswerSet::from_sparse(3, &HashMap::from([(0, "a".to_string())])),
        );
        let redacted = result.redacted();
        assert!(redacted.per_question.iter().all(|p| p.correct_answer.is_none()));
        assert!(redacted.per_question.iter().all(|p| p.explanation.is_none()));
        assert_eq!(redacted.raw_score, result.raw_score);
        assert_eq!(redacted.per_question[0].selected, Some("a".to_string()));
    }
}
