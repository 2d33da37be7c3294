use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const MIN_OPTIONS: usize = 2;
pub const MAX_OPTIONS: usize = 6;

fn default_time_limit() -> u32 {
    1800
}

fn default_passing_score() -> u8 {
    70
}

fn default_attempts_allowed() -> u32 {
    3
}

fn default_show_correct_answers() -> bool {
    true
}

fn default_points() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic: Option<String>,
    #[serde(default = "default_points")]
    pub points: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuizDefinition {
    #[serde(default = "default_time_limit")]
    pub time_limit_seconds: u32,
    #[serde(default = "default_passing_score")]
    pub passing_score_percent: u8,
    #[serde(default = "default_attempts_allowed")]
    pub attempts_allowed: u32,
    #[serde(default)]
    pub randomize_questions: bool,
    #[serde(default = "default_show_correct_answers")]
    pub show_correct_answers: bool,
    pub questions: Vec<QuizQuestion>,
}

impl QuizDefinition {
    // Authoring displays a point total even though grading counts questions.
    pub fn total_points(&self) -> u32 {
        self.questions.iter().map(|q| q.points).sum()
    }

    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let definition: Self = serde_json::from_str(raw)?;
        if let Err(issues) = validate_definition(&definition) {
            let first = &issues[0];
            anyhow::bail!(
                "quiz definition failed validation ({} issue(s), first: {} {})",
                issues.len(),
                first.field,
                first.issue
            );
        }
        Ok(definition)
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationIssue {
    pub field: String,
    pub issue: String,
}

pub fn validate_definition(definition: &QuizDefinition) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if definition.time_limit_seconds == 0 {
        issues.push(ValidationIssue {
            field: "timeLimitSeconds".into(),
            issue: "must be positive".into(),
        });
    }
    if definition.passing_score_percent > 100 {
        issues.push(ValidationIssue {
            field: "passingScorePercent".into(),
            issue: "must be between 0 and 100".into(),
        });
    }
    if definition.attempts_allowed == 0 {
        issues.push(ValidationIssue {
            field: "attemptsAllowed".into(),
            issue: "must be positive".into(),
        });
    }
    if definition.questions.is_empty() {
        issues.push(ValidationIssue {
            field: "questions".into(),
            issue: "must contain at least one question".into(),
        });
    }

    let mut question_ids = HashSet::new();
    for (i, q) in definition.questions.iter().enumerate() {
        if q.id.trim().is_empty() {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].id"),
                issue: "must not be empty".into(),
            });
        }
        if !question_ids.insert(q.id.clone()) {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].id"),
                issue: "must be unique".into(),
            });
        }
        if q.text.trim().is_empty() {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].text"),
                issue: "must not be empty".into(),
            });
        }
        if q.options.len() < MIN_OPTIONS || q.options.len() > MAX_OPTIONS {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].options"),
                issue: format!("must contain {MIN_OPTIONS} to {MAX_OPTIONS} options"),
            });
        }
        for (j, option) in q.options.iter().enumerate() {
            if option.trim().is_empty() {
                issues.push(ValidationIssue {
                    field: format!("questions[{i}].options[{j}]"),
                    issue: "must not be empty".into(),
                });
            }
        }
        if !q.options.iter().any(|o| o == &q.correct_answer) {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].correctAnswer"),
                issue: "must equal one of the options".into(),
            });
        }
        if q.points == 0 {
            issues.push(ValidationIssue {
                field: format!("questions[{i}].points"),
                issue: "must be positive".into(),
            });
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}
