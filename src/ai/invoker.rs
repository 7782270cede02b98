use crate::ai::types::{ChatMessage, ChatRequest, LlmError, LlmProvider};
use crate::config::ModelConfig;
use log::{error, info, warn};

/// 单次请求的调用器：一个 provider + 一份模型参数，不做重试
#[derive(Clone)]
pub struct PromptInvoker<P: LlmProvider> {
    provider: P,
    config: ModelConfig,
}

impl<P: LlmProvider> PromptInvoker<P> {
    pub fn new(provider: P, config: ModelConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    pub async fn chat(&self, messages: Vec<ChatMessage>) -> Result<String, LlmError> {
        let req = ChatRequest {
            model: self.config.model.clone(),
            messages,
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
            stop: self.config.stop.clone(),
        };
        match self.provider.chat(req).await {
            Ok(resp) => {
                info!("✓ 模型返回 {} 字符", resp.text.len());
                Ok(resp.text)
            }
            Err(e) => {
                if e.is_auth() {
                    error!("✗ API key 被拒绝: {}", e);
                } else if e.is_network() {
                    warn!("✗ 网络错误: {}", e);
                } else if e.is_malformed() {
                    warn!("✗ 响应格式异常: {}", e);
                } else {
                    warn!("✗ 模型调用失败: {}", e);
                }
                Err(e)
            }
        }
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, LlmError> {
        self.chat(vec![ChatMessage::user(prompt)]).await
    }

    pub async fn complete_with_system(&self, system: &str, prompt: &str) -> Result<String, LlmError> {
        self.chat(vec![ChatMessage::system(system), ChatMessage::user(prompt)])
            .await
    }

    /// 失败时返回 "Error: ..." 文本而不是错误
    pub async fn ask(&self, prompt: &str) -> String {
        render(self.complete(prompt).await)
    }
}

pub fn render(result: Result<String, LlmError>) -> String {
    match result {
        Ok(text) => text,
        Err(e) => error_text(&e),
    }
}

pub fn error_text(e: &dyn std::fmt::Display) -> String {
    format!("Error: {}", e)
}
