pub mod invoker;
pub mod openai;
pub mod types;

pub use invoker::PromptInvoker;
pub use openai::OpenAiProvider;
pub use types::{ChatMessage, ChatRole, LlmError, LlmProvider};

pub(crate) fn build_llm_http_client() -> Result<reqwest::Client, LlmError> {
    let proxy = std::env::var("LLM_PROXY").ok();
    http_client_with_proxy(proxy.as_deref())
}

/// 空值表示直连；不带协议的 `host:port` 按 socks5h 处理
fn http_client_with_proxy(proxy: Option<&str>) -> Result<reqwest::Client, LlmError> {
    let mut builder = reqwest::Client::builder();

    if let Some(url) = proxy.and_then(proxy_url) {
        let proxy = reqwest::Proxy::all(&url)
            .map_err(|e| LlmError::InvalidConfig(format!("LLM_PROXY {}: {}", url, e)))?;
        builder = builder.proxy(proxy);
    }

    builder.build().map_err(|e| LlmError::Http(e.to_string()))
}

fn proxy_url(raw: &str) -> Option<String> {
    let t = raw.trim();
    if t.is_empty() {
        None
    } else if t.contains("://") {
        Some(t.to_string())
    } else {
        Some(format!("socks5h://{}", t))
    }
}
