//! crates/dyslexia_core/src/quiz.rs
//!
//! Positional quiz scoring.

use crate::domain::QuizQuestion;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuizScore {
    pub correct_count: usize,
    pub total_questions: usize,
    /// Percentage in `0.0..=100.0`, rounded to two decimals.
    pub score: f64,
}

/// Compares each submitted answer with the question at the same position.
///
/// Missing answers count as wrong, surplus answers are ignored.
pub fn score_answers(questions: &[QuizQuestion], answers: &[String]) -> QuizScore {
    let total_questions = questions.len();
    let correct_count = questions
        .iter()
        .zip(answers)
        .filter(|(question, answer)| question.correct_answer == **answer)
        .count();

    let score = if total_questions == 0 {
        0.0
    } else {
        round2(correct_count as f64 / total_questions as f64 * 100.0)
    };

    QuizScore {
        correct_count,
        total_questions,
        score,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
