use crate::ai::build_llm_http_client;
use crate::ai::types::{ChatMessage, ChatRequest, ChatResponse, LlmError, LlmProvider};
use crate::config::{DEFAULT_BASE_URL, ENV_API_KEY, ENV_BASE_URL};
use async_trait::async_trait;
use log::info;
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::Value;

#[derive(Clone)]
pub struct OpenAiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stop: Option<&'a [String]>,
}

impl OpenAiProvider {
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var(ENV_API_KEY)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or(LlmError::MissingEnv(ENV_API_KEY))?;
        let base_url = std::env::var(ENV_BASE_URL)
            .ok()
            .filter(|u| !u.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        Self::new(api_key, base_url)
    }

    /// LLM_PROXY 无效时直接报错，不静默退回直连
    pub fn new(api_key: String, base_url: String) -> Result<Self, LlmError> {
        Ok(Self {
            client: build_llm_http_client()?,
            api_key,
            base_url,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    async fn chat(&self, req: ChatRequest) -> Result<ChatResponse, LlmError> {
        let url = format!("{}/chat/completions", self.base_url.trim_end_matches('/'));
        let body = ChatCompletionBody {
            model: &req.model,
            messages: &req.messages,
            temperature: req.temperature,
            max_tokens: req.max_tokens,
            stop: (!req.stop.is_empty()).then_some(req.stop.as_slice()),
        };

        info!(
            "chat(...) [{}] model={} messages={}",
            url,
            req.model,
            req.messages.len()
        );

        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        let raw = resp.text().await?;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(LlmError::Unauthorized(error_message(&raw)))
            }
            StatusCode::TOO_MANY_REQUESTS => return Err(LlmError::RateLimited(error_message(&raw))),
            _ => {}
        }

        if !status.is_success() {
            return Err(LlmError::Status {
                status: status.as_u16(),
                message: error_message(&raw),
            });
        }

        let text = extract_text(&raw)?;
        Ok(ChatResponse {
            text,
            raw: Some(raw),
        })
    }
}

/// 优先取 OpenAI 风格的 error.message，否则原样返回 body
fn error_message(raw: &str) -> String {
    serde_json::from_str::<Value>(raw)
        .ok()
        .and_then(|v| {
            v.get("error")
                .and_then(|e| e.get("message").or(Some(e)))
                .and_then(|m| m.as_str().map(str::to_string))
        })
        .unwrap_or_else(|| raw.trim().to_string())
}

pub(crate) fn extract_text(raw: &str) -> Result<String, LlmError> {
    let v: Value = serde_json::from_str(raw)
        .map_err(|e| LlmError::InvalidResponse(format!("json parse failed: {e}, raw={raw}")))?;

    // 兼容多种返回结构：message.content（字符串或数组）、content、text
    let choice0 = v
        .get("choices")
        .and_then(|c| c.get(0))
        .ok_or_else(|| LlmError::InvalidResponse(format!("missing choices[0], raw={raw}")))?;

    let content = choice0
        .get("message")
        .and_then(|m| m.get("content"))
        .or_else(|| choice0.get("content"));

    let text = if let Some(content) = content {
        match content {
            Value::String(s) => s.clone(),
            Value::Array(arr) => {
                let mut parts = Vec::new();
                for it in arr {
                    if let Some(t) = it.get("text").and_then(|x| x.as_str()) {
                        parts.push(t.to_string());
                    } else if let Some(t) = it.as_str() {
                        parts.push(t.to_string());
                    }
                }
                parts.join("\n")
            }
            Value::Null => String::new(),
            _ => {
                return Err(LlmError::InvalidResponse(format!(
                    "unexpected content type, raw={raw}"
                )))
            }
        }
    } else if let Some(Value::String(s)) = choice0.get("text") {
        s.clone()
    } else {
        return Err(LlmError::InvalidResponse(format!(
            "missing content/text in choices[0], raw={raw}"
        )));
    };

    Ok(text)
}
