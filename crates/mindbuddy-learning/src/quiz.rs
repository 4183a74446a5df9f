//! Quiz attempt state

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use mindbuddy_core::QuizQuestion;

/// Minimum fraction of correct answers to pass, in percent.
pub const PASS_THRESHOLD_PERCENT: usize = 70;

/// Whether a score passes the threshold (`correct / total ≥ 70 %`),
/// computed in integers to avoid rounding surprises.
pub fn quiz_passes(correct: usize, total: usize) -> bool {
    total > 0 && correct * 100 >= total * PASS_THRESHOLD_PERCENT
}

/// Ephemeral per-lesson quiz state.
///
/// Created when a quiz lesson opens, destroyed when the lesson is exited
/// or abandoned. Answers carry no correctness information — scoring is
/// deferred to submission.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuizAttempt {
    /// Selected option per question id; re-answering overwrites
    answers: BTreeMap<String, usize>,
    current_question: usize,
}

impl QuizAttempt {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record or overwrite the selected option for a question
    pub fn answer(&mut self, question_id: &str, option_index: usize) {
        self.answers.insert(question_id.to_string(), option_index);
    }

    pub fn current_question(&self) -> usize {
        self.current_question
    }

    /// Move to the next question, returning its index
    pub fn advance_question(&mut self) -> usize {
        self.current_question += 1;
        self.current_question
    }

    /// Count answers matching each question's correct index.
    /// Unanswered questions count as wrong.
    pub fn score(&self, questions: &[QuizQuestion]) -> usize {
        questions
            .iter()
            .filter(|q| self.answers.get(&q.id) == Some(&q.correct_index))
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(id: &str, correct_index: usize) -> QuizQuestion {
        QuizQuestion {
            id: id.into(),
            prompt: format!("question {}", id),
            options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
            correct_index,
        }
    }

    #[test]
    fn test_pass_threshold() {
        assert!(!quiz_passes(2, 3)); // 67 %
        assert!(quiz_passes(3, 3));
        assert!(quiz_passes(7, 10)); // exactly 70 %
        assert!(!quiz_passes(6, 10));
        assert!(!quiz_passes(0, 0));
    }

    #[test]
    fn test_reanswering_overwrites() {
        let questions = vec![question("q1", 2)];
        let mut attempt = QuizAttempt::new();

        attempt.answer("q1", 0);
        assert_eq!(attempt.score(&questions), 0);

        attempt.answer("q1", 2);
        assert_eq!(attempt.score(&questions), 1);
    }

    #[test]
    fn test_unanswered_counts_as_wrong() {
        let questions = vec![question("q1", 1), question("q2", 1)];
        let mut attempt = QuizAttempt::new();
        attempt.answer("q1", 1);
        assert_eq!(attempt.score(&questions), 1);
    }
}
