use crate::types::{PipelineError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;
use tracing::debug;

const OPENAI_CHAT_URL: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4.1-mini";

/// Rendering seam: turns an entry's title and body into display-ready HTML.
/// A failure here is scoped to the single entry being rendered.
#[async_trait]
pub trait Summarize: Send + Sync {
    async fn summarize(&self, title: &str, content: &str) -> Result<String>;
}

/// Summarizer backed by the OpenAI Chat Completions API.
pub struct OpenAiSummarizer {
    http: Client,
    api_key: String,
    model: String,
}

impl OpenAiSummarizer {
    /// Build from `OPENAI_API_KEY`. A missing key is a startup error for the
    /// whole run, not something to discover one entry at a time.
    pub fn from_env() -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| PipelineError::MissingCredential("OPENAI_API_KEY"))?;
        Ok(Self::new(api_key, None))
    }

    pub fn new(api_key: String, model_override: Option<&str>) -> Self {
        let http = Client::builder()
            .connect_timeout(Duration::from_secs(4))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            http,
            api_key,
            model: model_override.unwrap_or(DEFAULT_MODEL).to_string(),
        }
    }

    fn build_prompt(title: &str, content: &str) -> String {
        format!(
            "あなたは最先端のトレンドを追う知的好奇心旺盛な読者向けの編集者です。\n\
             次の英語記事を日本語で要約し、RSSリーダーで読みやすいHTML形式で出力してください。\n\
             \n\
             ## 出力フォーマット（HTML）\n\
             <p><strong>一言で言うと:</strong> （1文で核心を突く）</p>\n\
             <p><strong>ポイント:</strong></p>\n\
             <ul>\n\
             <li>（重要な発見・主張を3〜4点）</li>\n\
             </ul>\n\
             <p><strong>So What?:</strong> （この情報が読者にとってなぜ重要か、どう活かせるか）</p>\n\
             \n\
             ## ルール\n\
             - 必ず上記のHTML形式で出力すること\n\
             - 専門用語は残しつつ、初見でも分かる短い補足を括弧内に\n\
             - 「〜と思われる」「〜の可能性」など、推測と事実を区別\n\
             - 堅すぎず、知的な友人に話すようなトーンで\n\
             - 200〜300字程度\n\
             \n\
             ## 記事情報\n\
             TITLE: {title}\n\
             \n\
             CONTENT:\n\
             {content}"
        )
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}

#[async_trait]
impl Summarize for OpenAiSummarizer {
    async fn summarize(&self, title: &str, content: &str) -> Result<String> {
        debug!("Summarizing: {}", title);

        let prompt = Self::build_prompt(title, content);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
        };

        let response = self
            .http
            .post(OPENAI_CHAT_URL)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PipelineError::Summarize(format!(
                "chat completion returned HTTP {}",
                status
            )));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .first()
            .map(|c| c.message.content.trim().to_string())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| PipelineError::Summarize("empty completion".to_string()))?;

        Ok(content)
    }
}
