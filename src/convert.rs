use crate::ai::{LlmError, LlmProvider, PromptInvoker};
use crate::config::{ModelDefaults, NANO_MODEL};
use crate::fsio::{read_text, write_text, FileError};
use crate::prompt::parser::strip_code_fences;
use log::info;
use std::path::{Path, PathBuf};

pub const DEFAULT_INPUT: &str = "sample.cbl";
pub const DEFAULT_OUTPUT: &str = "java_ai.java";
pub const CONVERT_DEFAULTS: ModelDefaults = ModelDefaults::new(NANO_MODEL, 0.3, Some(2000));

const GUIDELINES: [&str; 15] = [
    "Follow Java naming conventions (camelCase for variables, PascalCase for classes)",
    "Use proper Java data types that match COBOL data types",
    "Include proper Java package declaration",
    "Add comprehensive JavaDoc comments",
    "Follow Java best practices and design patterns",
    "Ensure the code is compilable without any errors",
    "Include proper error handling",
    "Use appropriate Java collections and data structures",
    "Follow SOLID principles",
    "Include proper access modifiers",
    "Use proper Java logging instead of DISPLAY statements",
    "Convert COBOL file operations to appropriate Java I/O operations",
    "Handle COBOL numeric data types appropriately in Java",
    "Convert COBOL PERFORM statements to appropriate Java loops",
    "Ensure thread safety where applicable",
];

#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    File(#[from] FileError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("input file {0} is empty")]
    EmptyInput(PathBuf),
}

pub fn system_prompt() -> String {
    let mut lines = Vec::new();
    lines.push(
        "You are an expert COBOL to Java conversion specialist with deep knowledge of both languages."
            .to_string(),
    );
    lines.push(
        "Your task is to convert COBOL code to Java while following these strict guidelines:"
            .to_string(),
    );
    for (i, g) in GUIDELINES.iter().enumerate() {
        lines.push(format!("{}. {}", i + 1, g));
    }
    lines.push("".to_string());
    lines.push(
        "Return only the Java code without any additional explanations or markdown formatting."
            .to_string(),
    );
    lines.push("The code should be immediately compilable and runnable.".to_string());
    lines.join("\n")
}

pub fn user_prompt(cobol_code: &str) -> String {
    let mut lines = Vec::new();
    lines.push(
        "Convert the following COBOL code to Java while strictly following the guidelines above."
            .to_string(),
    );
    lines.push(
        "Ensure the converted code is production-ready and follows all Java standards."
            .to_string(),
    );
    lines.push("".to_string());
    lines.push("COBOL Code:".to_string());
    lines.push(cobol_code.to_string());
    lines.join("\n")
}

pub async fn convert_cobol_to_java<P: LlmProvider>(
    invoker: &PromptInvoker<P>,
    cobol_code: &str,
) -> Result<String, LlmError> {
    let raw = invoker
        .complete_with_system(&system_prompt(), &user_prompt(cobol_code))
        .await?;
    Ok(strip_code_fences(&raw))
}

/// 读 COBOL 文件 -> 转换 -> 写 Java 文件；模型失败时不落盘
pub async fn convert_file<P: LlmProvider>(
    invoker: &PromptInvoker<P>,
    input: &Path,
    output: &Path,
) -> Result<usize, ConvertError> {
    let cobol = read_text(input).await?;
    if cobol.trim().is_empty() {
        return Err(ConvertError::EmptyInput(input.to_path_buf()));
    }
    let java = convert_cobol_to_java(invoker, &cobol).await?;
    write_text(output, &java).await?;
    info!(
        "✓ 转换完成 {} -> {} ({} 行)",
        input.display(),
        output.display(),
        java.lines().count()
    );
    Ok(java.len())
}
