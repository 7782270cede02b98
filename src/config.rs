use log::warn;

pub const ENV_API_KEY: &str = "OPENAI_API_KEY";
pub const ENV_MODEL: &str = "OPENAI_MODEL";
pub const ENV_TEMPERATURE: &str = "OPENAI_TEMPERATURE";
pub const ENV_MAX_TOKENS: &str = "OPENAI_MAX_TOKENS";
pub const ENV_BASE_URL: &str = "OPENAI_BASE_URL";

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
pub const NANO_MODEL: &str = "gpt-4.1-nano-2025-04-14";
pub const TURBO_MODEL: &str = "gpt-3.5-turbo";

/// 每个示例内置的兜底参数，环境变量缺失时使用
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ModelDefaults {
    pub model: &'static str,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
}

impl ModelDefaults {
    pub const fn new(model: &'static str, temperature: f32, max_tokens: Option<u32>) -> Self {
        Self {
            model,
            temperature,
            max_tokens,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct ModelConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: Option<u32>,
    pub stop: Vec<String>,
}

impl ModelConfig {
    pub fn from_env(defaults: ModelDefaults) -> Self {
        Self::from_lookup(defaults, |key| std::env::var(key).ok())
    }

    /// 按 key 查值；空字符串视为未设置，解析失败或越界时回落到默认值
    pub fn from_lookup<F>(defaults: ModelDefaults, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let model = get(ENV_MODEL).unwrap_or_else(|| defaults.model.to_string());

        let temperature = match get(ENV_TEMPERATURE) {
            Some(raw) => match raw.parse::<f32>() {
                Ok(t) if (0.0..=2.0).contains(&t) => t,
                Ok(t) => {
                    warn!(
                        "{} 超出范围 [0, 2]: {}, 使用默认值 {}",
                        ENV_TEMPERATURE, t, defaults.temperature
                    );
                    defaults.temperature
                }
                Err(_) => {
                    warn!(
                        "{} 无法解析: {:?}, 使用默认值 {}",
                        ENV_TEMPERATURE, raw, defaults.temperature
                    );
                    defaults.temperature
                }
            },
            None => defaults.temperature,
        };

        let max_tokens = match get(ENV_MAX_TOKENS) {
            Some(raw) => match raw.parse::<u32>() {
                Ok(n) if n > 0 => Some(n),
                _ => {
                    warn!(
                        "{} 无法解析: {:?}, 使用默认值 {:?}",
                        ENV_MAX_TOKENS, raw, defaults.max_tokens
                    );
                    defaults.max_tokens
                }
            },
            None => defaults.max_tokens,
        };

        Self {
            model,
            temperature,
            max_tokens,
            stop: Vec::new(),
        }
    }

    pub fn with_stop<I, S>(mut self, stop: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop = stop.into_iter().map(Into::into).collect();
        self
    }
}

impl From<ModelDefaults> for ModelConfig {
    fn from(d: ModelDefaults) -> Self {
        Self {
            model: d.model.to_string(),
            temperature: d.temperature,
            max_tokens: d.max_tokens,
            stop: Vec::new(),
        }
    }
}
