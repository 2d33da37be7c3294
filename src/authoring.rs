use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::QuizError;
use crate::models::{validate_definition, QuizDefinition, QuizQuestion, MAX_OPTIONS, MIN_OPTIONS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub options: Vec<String>,
    #[serde(default)]
    pub correct_answer: String,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub points: u32,
}

impl Default for QuestionDraft {
    fn default() -> Self {
        Self {
            id: String::new(),
            text: String::new(),
            options: vec![String::new(), String::new()],
            correct_answer: String::new(),
            explanation: String::new(),
            topic: String::new(),
            points: 1,
        }
    }
}

impl QuestionDraft {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    pub fn add_option(&mut self) -> bool {
        if self.options.len() >= MAX_OPTIONS {
            return false;
        }
        self.options.push(String::new());
        true
    }

    // The correct answer is bound by value, so editing the selected
    // option's text must carry the binding along with it.
    pub fn rename_option(&mut self, index: usize, new_text: impl Into<String>) {
        let Some(slot) = self.options.get_mut(index) else {
            return;
        };
        let new_text = new_text.into();
        if !self.correct_answer.is_empty() && *slot == self.correct_answer {
            self.correct_answer = new_text.clone();
        }
        *slot = new_text;
    }

    pub fn remove_option(&mut self, index: usize) -> bool {
        if index >= self.options.len() || self.options.len() <= MIN_OPTIONS {
            return false;
        }
        let removed = self.options.remove(index);
        if removed == self.correct_answer {
            // Forces the author to pick the correct answer again.
            self.correct_answer.clear();
        }
        true
    }

    pub fn select_correct(&mut self, index: usize) -> bool {
        match self.options.get(index) {
            Some(option) => {
                self.correct_answer = option.clone();
                true
            }
            None => false,
        }
    }

    fn non_empty_options(&self) -> Vec<String> {
        self.options
            .iter()
            .filter(|o| !o.trim().is_empty())
            .cloned()
            .collect()
    }
}

pub fn compile_drafts(drafts: &[QuestionDraft]) -> Result<(Vec<QuizQuestion>, usize), QuizError> {
    let mut valid = Vec::new();
    let mut rejected = 0usize;
    let mut seen_ids = HashSet::new();

    for (i, draft) in drafts.iter().enumerate() {
        let options = draft.non_empty_options();
        let usable = !draft.text.trim().is_empty()
            && options.len() >= MIN_OPTIONS
            && options.len() <= MAX_OPTIONS
            && !draft.correct_answer.trim().is_empty()
            && options.iter().any(|o| o == &draft.correct_answer);
        if !usable {
            rejected += 1;
            continue;
        }

        let id = if draft.id.trim().is_empty() {
            format!("q{}", i + 1)
        } else {
            draft.id.clone()
        };
        if !seen_ids.insert(id.clone()) {
            rejected += 1;
            continue;
        }

        valid.push(QuizQuestion {
            id,
            text: draft.text.clone(),
            options,
            correct_answer: draft.correct_answer.clone(),
            explanation: none_if_blank(&draft.explanation),
            topic: none_if_blank(&draft.topic),
            points: draft.points.max(1),
        });
    }

    if valid.is_empty() {
        return Err(QuizError::EmptyQuizDefinition);
    }
    Ok((valid, rejected))
}

fn default_show_correct() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizSettings {
    #[serde(default)]
    pub time_limit_seconds: Option<u32>,
    #[serde(default)]
    pub passing_score_percent: Option<u8>,
    #[serde(default)]
    pub attempts_allowed: Option<u32>,
    #[serde(default)]
    pub randomize_questions: bool,
    #[serde(default = "default_show_correct")]
    pub show_correct_answers: bool,
}

impl Default for QuizSettings {
    fn default() -> Self {
        Self {
            time_limit_seconds: None,
            passing_score_percent: None,
            attempts_allowed: None,
            randomize_questions: false,
            show_correct_answers: true,
        }
    }
}

pub fn build_definition(
    settings: &QuizSettings,
    drafts: &[QuestionDraft],
) -> Result<(QuizDefinition, usize), QuizError> {
    let (questions, rejected) = compile_drafts(drafts)?;
    let definition = QuizDefinition {
        time_limit_seconds: settings.time_limit_seconds.filter(|v| *v > 0).unwrap_or(1800),
        passing_score_percent: settings.passing_score_percent.unwrap_or(70).min(100),
        attempts_allowed: settings.attempts_allowed.filter(|v| *v > 0).unwrap_or(3),
        randomize_questions: settings.randomize_questions,
        show_correct_answers: settings.show_correct_answers,
        questions,
    };
    debug_assert!(validate_definition(&definition).is_ok());
    Ok((definition, rejected))
}

fn none_if_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}
