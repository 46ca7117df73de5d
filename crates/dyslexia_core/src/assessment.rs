//! crates/dyslexia_core/src/assessment.rs
//!
//! Rule-based difficulty and topic estimate for a text. Used on its own when
//! no language model is configured, and as the fallback when the model fails.

use crate::domain::{Level, LevelAssessment};
use regex::Regex;
use std::sync::OnceLock;

pub const FALLBACK_TOPIC: &str = "Khác";

/// Keyword groups checked in order; the first match wins.
const TOPIC_KEYWORDS: &[(&str, &str)] = &[
    ("Động vật", r"mèo|chó|gà|chim|thú|động vật"),
    ("Thiên nhiên", r"cây|hoa|rừng|sông|biển|núi|thiên nhiên"),
    ("Thức ăn", r"cơm|phở|bánh|ăn|món|thức ăn"),
    ("Gia đình", r"bố|mẹ|con|anh|em|gia đình"),
    ("Truyện", r"truyện|cổ tích|ngày xưa"),
    ("Học tập", r"trường|học|bài|giáo viên"),
    ("Thể thao", r"bóng|chạy|nhảy|thể thao"),
];

fn topic_patterns() -> &'static [(&'static str, Regex)] {
    static PATTERNS: OnceLock<Vec<(&'static str, Regex)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        TOPIC_KEYWORDS
            .iter()
            .map(|(topic, pattern)| (*topic, Regex::new(pattern).expect("topic pattern is valid")))
            .collect()
    })
}

pub fn detect_topic(content: &str) -> &'static str {
    let lower = content.to_lowercase();
    topic_patterns()
        .iter()
        .find(|(_, re)| re.is_match(&lower))
        .map(|(topic, _)| *topic)
        .unwrap_or(FALLBACK_TOPIC)
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

pub fn assess_by_rules(content: &str) -> LevelAssessment {
    let words: Vec<&str> = content.split_whitespace().collect();
    let sentence_count = content
        .split(['.', '!', '?'])
        .filter(|s| !s.trim().is_empty())
        .count()
        .max(1);

    let avg_word_length = if words.is_empty() {
        0.0
    } else {
        words.iter().map(|w| w.chars().count()).sum::<usize>() as f64 / words.len() as f64
    };
    let avg_sentence_length = words.len() as f64 / sentence_count as f64;

    let level = if avg_word_length > 6.0 && avg_sentence_length > 12.0 {
        Level::B2
    } else if avg_word_length > 5.0 || avg_sentence_length > 10.0 {
        Level::B1
    } else if avg_word_length > 4.0 || avg_sentence_length > 8.0 {
        Level::A2
    } else {
        Level::A1
    };

    LevelAssessment {
        level,
        recommended_topic: detect_topic(content).to_string(),
        reason: format!(
            "Văn bản có độ dài từ trung bình {:.1} ký tự, {:.1} từ/câu. Cấp độ và chủ đề được đề xuất dựa trên phân tích văn bản.",
            avg_word_length, avg_sentence_length
        ),
        avg_word_length: round_to(avg_word_length, 2),
        avg_sentence_length: round_to(avg_sentence_length, 1),
        difficult_words: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_simple_text_is_a1() {
        let result = assess_by_rules("Con mèo nhỏ. Nó ngủ.");
        assert_eq!(result.level, Level::A1);
        assert_eq!(result.recommended_topic, "Động vật");
    }

    #[test]
    fn long_words_and_sentences_are_b2() {
        let sentence = "extraordinary environmental transformations ".repeat(5);
        let result = assess_by_rules(&format!("{}.", sentence));
        assert_eq!(result.level, Level::B2);
        assert_eq!(result.recommended_topic, FALLBACK_TOPIC);
    }

    #[test]
    fn first_matching_topic_wins() {
        assert_eq!(detect_topic("Cây hoa trong vườn"), "Thiên nhiên");
        assert_eq!(detect_topic("Đi học ở trường"), "Học tập");
    }

    #[test]
    fn empty_text_does_not_divide_by_zero() {
        let result = assess_by_rules("   ");
        assert_eq!(result.avg_word_length, 0.0);
        assert_eq!(result.avg_sentence_length, 0.0);
        assert_eq!(result.level, Level::A1);
    }
}
