//! services/api/src/adapters/assess_llm.rs
//!
//! This module contains the adapter for the level-assessment LLM.
//! It implements the `LevelAssessmentService` port from the `core` crate.

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use dyslexia_core::domain::{Level, LevelAssessment};
use dyslexia_core::ports::{LevelAssessmentService, PortError, PortResult};
use serde::Deserialize;

const SYSTEM_PROMPT: &str = "Bạn là chuyên gia đánh giá độ khó văn bản cho trẻ em Việt Nam bị chứng khó đọc (Dyslexia). \
Đánh giá theo: độ dài từ, tần suất từ vựng, độ dài câu, cấu trúc ngữ pháp, chủ đề và số lượng từ khó. \
Cấp độ: A1 (rất dễ), A2 (dễ), B1 (trung bình), B2 (khó). \
Chủ đề là một trong: Động vật, Thiên nhiên, Thức ăn, Gia đình, Truyện, Học tập, Phiêu lưu, Thể thao, Khác. \
Chỉ trả về JSON thuần với các khóa: level, recommendedTopic, reason, avgWordLength, avgSentenceLength, difficultWords.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `LevelAssessmentService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAssessAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAssessAdapter {
    /// Creates a new `OpenAiAssessAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssessmentJson {
    level: String,
    recommended_topic: String,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    avg_word_length: f64,
    #[serde(default)]
    avg_sentence_length: f64,
    #[serde(default)]
    difficult_words: Vec<String>,
}

/// Parses the model's reply, tolerating a surrounding markdown code fence.
fn parse_reply(reply: &str) -> PortResult<LevelAssessment> {
    let json = reply
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim();

    let parsed: AssessmentJson = serde_json::from_str(json)
        .map_err(|e| PortError::Unexpected(format!("unparseable assessment: {}", e)))?;
    let level = parsed
        .level
        .parse::<Level>()
        .map_err(|e| PortError::Unexpected(e.to_string()))?;

    Ok(LevelAssessment {
        level,
        recommended_topic: parsed.recommended_topic,
        reason: parsed.reason,
        avg_word_length: parsed.avg_word_length,
        avg_sentence_length: parsed.avg_sentence_length,
        difficult_words: parsed.difficult_words,
    })
}

//=========================================================================================
// `LevelAssessmentService` Trait Implementation
//=========================================================================================

#[async_trait]
impl LevelAssessmentService for OpenAiAssessAdapter {
    async fn assess(&self, content: &str) -> PortResult<LevelAssessment> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_PROMPT)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(format!("Văn bản cần đánh giá:\n\"\"\"\n{}\n\"\"\"", content))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.2)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let reply = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| PortError::Unexpected("No assessment generated".to_string()))?;

        parse_reply(&reply)
    }
}
