use crate::ai::{LlmError, LlmProvider, PromptInvoker};
use crate::config::{ModelDefaults, NANO_MODEL};
use crate::prompt::template::{PromptTemplate, TemplateError};
use log::info;
use std::collections::HashMap;

pub const SUMMARY_TEMPLATE: &str = "
    Please provide a concise summary of the following text:

    {text}

    Summary:
    ";

pub const SUMMARY_DEFAULTS: ModelDefaults = ModelDefaults::new(NANO_MODEL, 0.7, None);

pub const SAMPLE_TEXT: &str = "
    Artificial Intelligence (AI) is the simulation of human intelligence by machines.
    It encompasses machine learning, natural language processing, and robotics.
    AI systems can learn from experience, adjust to new inputs, and perform human-like tasks.
    ";

#[derive(thiserror::Error, Debug)]
pub enum ChainError {
    #[error(transparent)]
    Template(#[from] TemplateError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("chain expects exactly one input variable, template has {0}")]
    NotSingleInput(usize),
}

/// prompt 模板 -> 模型 -> 字符串输出
pub struct LlmChain<P: LlmProvider> {
    prompt: PromptTemplate,
    invoker: PromptInvoker<P>,
}

impl<P: LlmProvider> LlmChain<P> {
    pub fn new(prompt: PromptTemplate, invoker: PromptInvoker<P>) -> Self {
        Self { prompt, invoker }
    }


    pub async fn invoke_with(&self, values: &HashMap<&str, &str>) -> Result<String, ChainError> {
        let filled = self.prompt.fill(values)?;
        info!("chain 调用，prompt 长度 {}", filled.len());
        let raw = self.invoker.complete(&filled).await?;
        Ok(parse_output(&raw))
    }

    /// 单变量模板的快捷方式：输入直接透传给唯一的占位符
    pub async fn invoke(&self, input: &str) -> Result<String, ChainError> {
        let vars = self.prompt.input_variables();
        if vars.len() != 1 {
            return Err(ChainError::NotSingleInput(vars.len()));
        }
        let values = HashMap::from([(vars[0], input)]);
        self.invoke_with(&values).await
    }
}

fn parse_output(raw: &str) -> String {
    raw.trim().to_string()
}

pub fn summary_chain<P: LlmProvider>(invoker: PromptInvoker<P>) -> Result<LlmChain<P>, TemplateError> {
    Ok(LlmChain::new(PromptTemplate::parse(SUMMARY_TEMPLATE)?, invoker))
}
