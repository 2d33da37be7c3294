use serde::Serialize;

use crate::scoring::QuizResult;

const GENERAL_TOPIC: &str = "General";

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct StudyFeedback {
    pub weak_areas: Vec<String>,
    pub recommendations: Vec<String>,
    pub detailed_feedback: String,
}

pub fn study_feedback(result: &QuizResult) -> StudyFeedback {
    StudyFeedback {
        weak_areas: weak_areas(result),
        recommendations: recommendations(result),
        detailed_feedback: detailed_feedback(result),
    }
}

pub fn weak_areas(result: &QuizResult) -> Vec<String> {
    let mut areas: Vec<String> = Vec::new();
    for entry in result.per_question.iter().filter(|p| !p.is_correct) {
        let topic = entry.topic.as_deref().unwrap_or(GENERAL_TOPIC);
        if topic != GENERAL_TOPIC && !areas.iter().any(|a| a == topic) {
            areas.push(topic.to_string());
        }
    }

    if areas.is_empty() {
        let wrong = result.per_question.iter().filter(|p| !p.is_correct).count();
        if wrong as f64 > result.per_question.len() as f64 * 0.3 {
            areas.push("Overall Understanding".to_string());
        }
    }
    areas
}

pub fn recommendations(result: &QuizResult) -> Vec<String> {
    let recs: &[&str] = if result.percentage < 50.0 {
        &[
            "Review all course materials thoroughly",
            "Consider retaking lessons you found challenging",
            "Take additional practice quizzes",
            "Seek help from instructor or peers",
        ]
    } else if result.percentage < 70.0 {
        &[
            "Focus on the topics you got wrong",
            "Review related lesson materials",
            "Practice similar questions",
            "Ask questions about unclear concepts",
        ]
    } else if result.percentage < 85.0 {
        &[
            "Great job! Review the few topics you missed",
            "Consider helping other students",
            "Try advanced practice questions",
        ]
    } else {
        &[
            "Excellent performance! You've mastered this material",
            "Consider taking advanced courses in this area",
            "Share your knowledge with other students",
        ]
    };
    recs.iter().map(|r| r.to_string()).collect()
}

pub fn detailed_feedback(result: &QuizResult) -> String {
    let mut feedback = format!(
        "You answered {} out of {} questions correctly ({:.1}%). ",
        result.raw_score, result.max_score, result.percentage
    );

    feedback.push_str(if result.percentage >= 90.0 {
        "Outstanding performance! You have excellent understanding of the material. "
    } else if result.percentage >= 80.0 {
        "Great work! You have a strong grasp of most concepts. "
    } else if result.percentage >= 70.0 {
        "Good job! You understand the basics well. "
    } else if result.percentage >= 60.0 {
        "You're on the right track, but need more practice. "
    } else {
        "This material needs more attention. Don't get discouraged! "
    });

    let wrong_topics: Vec<&str> = {
        let mut topics: Vec<&str> = result
            .per_question
            .iter()
            .filter(|p| !p.is_correct)
            .map(|p| p.topic.as_deref().unwrap_or(GENERAL_TOPIC))
            .collect();
        topics.sort_unstable();
        topics.dedup();
        topics
    };

    if !result.per_question.iter().all(|p| p.is_correct) {
        if wrong_topics.len() <= 2 && wrong_topics != [GENERAL_TOPIC] {
            feedback.push_str(&format!(
                "Focus your review on: {}. ",
                wrong_topics.join(", ")
            ));
        } else {
            feedback.push_str("Review the course materials comprehensively. ");
        }
    }
    feedback
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::PerQuestionResult;

    fn entry(topic: Option<&str>, is_correct: bool) -> PerQuestionResult {
        PerQuestionResult {
            question_id: "q".into(),
            question_text: "Q".into(),
            selected: Some("a".into()),
            correct_answer: Some("a".into()),
            is_correct,
            explanation: None,
            topic: topic.map(|t| t.to_string()),
        }
    }

    fn result_with(per_question: Vec<PerQuestionResult>) -> QuizResult {
        let raw = per_question.iter().filter(|p| p.is_correct).count() as u32;
        let max = per_question.len() as u32;
        QuizResult {
            raw_score: raw,
            max_score: max,
            percentage: f64::from(raw) * 100.0 / f64::from(max),
            passed: true,
            per_question,
        }
    }

    #[test]
    fn weak_areas_collects_topics_of_wrong_answers() {
        let result = result_with(vec![
            entry(Some("Algebra"), false),
            entry(Some("Algebra"), false),
            entry(Some("Geometry"), false),
            entry(Some("Sets"), true),
        ]);
        assert_eq!(weak_areas(&result), vec!["Algebra", "Geometry"]);
    }

    #[test]
    fn untopiced_misses_fall_back_to_overall_understanding() {
        let result = result_with(vec![
            entry(None, false),
            entry(None, false),
            entry(None, true),
        ]);
        assert_eq!(weak_areas(&result), vec!["Overall Understanding"]);
    }

    #[test]
    fn a_single_untopiced_miss_reports_no_weak_areas() {
        let result = result_with(vec![
            entry(None, false),
            entry(None, true),
            entry(None, true),
            entry(None, true),
        ]);
        assert!(weak_areas(&result).is_empty());
    }

    #[test]
    fn recommendations_follow_percentage_bands() {
        let low = result_with(vec![entry(None, false), entry(None, false)]);
        assert!(recommendations(&low)[0].contains("thoroughly"));

        let high = result_with(vec![entry(None, true), entry(None, true)]);
        assert!(recommendations(&high)[0].contains("Excellent"));
    }

    #[test]
    fn detailed_feedback_quotes_score_and_names_topics() {
        let result = result_with(vec![
            entry(Some("Fractions"), false),
            entry(None, true),
            entry(None, true),
        ]);
        let text = detailed_feedback(&result);
        assert!(text.contains("2 out of 3"));
        assert!(text.contains("66.7%"));
        assert!(text.contains("Focus your review on: Fractions."));
    }

    #[test]
    fn study_feedback_bundles_all_three_views() {
        let result = result_with(vec![
            entry(Some("Loops"), false),
            entry(None, true),
            entry(None, true),
            entry(None, true),
        ]);
        let bundle = study_feedback(&result);
        assert_eq!(bundle.weak_areas, vec!["Loops"]);
        assert!(bundle.recommendations[0].contains("few topics you missed"));
        assert!(bundle.detailed_feedback.contains("3 out of 4"));
    }

    #[test]
    fn perfect_result_gets_no_review_advice() {
        let result = result_with(vec![entry(None, true), entry(None, true)]);
        let text = detailed_feedback(&result);
        assert!(text.contains("2 out of 2"));
        assert!(!text.contains("Focus your review"));
        assert!(!text.contains("comprehensively"));
    }
}
