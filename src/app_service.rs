use crate::ai::invoker::error_text;
use crate::ai::{LlmProvider, PromptInvoker};
use crate::chain::{summary_chain, SAMPLE_TEXT, SUMMARY_DEFAULTS};
use crate::chat::{run_chat, ChatSession, CHAT_DEFAULTS};
use crate::commands::{AppCommand, USAGE};
use crate::config::ModelConfig;
use crate::convert::{convert_file, CONVERT_DEFAULTS};
use crate::crew::json_pipeline::CREW_DEFAULTS;
use crate::crew::JsonProcessor;
use crate::prompt::{Technique, TechniqueDemo};
use log::info;
use std::io::Write;
use std::path::Path;

pub async fn run_technique<P, W>(
    invoker: &PromptInvoker<P>,
    demo: &TechniqueDemo,
    out: &mut W,
) -> std::io::Result<()>
where
    P: LlmProvider,
    W: Write,
{
    info!(
        "运行示例: {} (model={}, temperature={})",
        demo.technique,
        invoker.config().model,
        invoker.config().temperature
    );
    if let Some(title) = &demo.title {
        writeln!(out, "{}", title)?;
    }
    for case in &demo.cases {
        if let Some(h) = &case.heading {
            writeln!(out, "{}", h)?;
        }
        let reply = invoker.ask(&case.prompt).await;
        let reply = if demo.trim {
            reply.trim().to_string()
        } else {
            reply
        };
        for (label, value) in &case.shown {
            writeln!(out, "{}: {}", label, value)?;
        }
        writeln!(out, "{}: {}\n", case.response_label, reply)?;
    }
    Ok(())
}

pub async fn run_summary<P: LlmProvider, W: Write>(
    invoker: PromptInvoker<P>,
    out: &mut W,
) -> std::io::Result<()> {
    writeln!(out, "Original Text:")?;
    writeln!(out, "{}", SAMPLE_TEXT)?;
    writeln!(out, "\nGenerating summary...")?;

    let result = match summary_chain(invoker) {
        Ok(chain) => chain.invoke(SAMPLE_TEXT).await.map_err(|e| error_text(&e)),
        Err(e) => Err(error_text(&e)),
    };
    match result {
        Ok(summary) => {
            writeln!(out, "\nSummary:")?;
            writeln!(out, "{}", summary)?;
        }
        Err(msg) => writeln!(out, "{}", msg)?,
    }
    Ok(())
}

pub async fn run_cobol<P: LlmProvider, W: Write>(
    invoker: &PromptInvoker<P>,
    input: &Path,
    output: &Path,
    out: &mut W,
) -> std::io::Result<()> {
    writeln!(out, "Converting COBOL to Java...")?;
    match convert_file(invoker, input, output).await {
        Ok(_) => writeln!(
            out,
            "Conversion complete. Java code saved to {}",
            output.display()
        )?,
        Err(e) => writeln!(out, "{}", error_text(&e))?,
    }
    Ok(())
}

pub async fn run_crew<P: LlmProvider, W: Write>(
    invoker: &PromptInvoker<P>,
    data_dir: &Path,
    out: &mut W,
) -> std::io::Result<()> {
    let processor = JsonProcessor::in_dir(data_dir);
    match processor.run(invoker).await {
        Ok(result) => {
            for t in &result.tasks_output {
                let summary = t.description.lines().next().unwrap_or_default();
                writeln!(out, "[{}] {}", t.agent, summary)?;
                if let Some(path) = &t.written_to {
                    writeln!(out, "  -> {}", path.display())?;
                }
            }
            writeln!(out, "\nFinal Result:")?;
            writeln!(out, "{}", result)?;
        }
        Err(e) => writeln!(out, "{}", error_text(&e))?,
    }
    Ok(())
}

/// 每个示例按自己的默认参数从环境变量解析配置
pub async fn dispatch<P, W>(cmd: AppCommand, provider: P, out: &mut W) -> anyhow::Result<()>
where
    P: LlmProvider + Clone,
    W: Write,
{
    match cmd {
        AppCommand::Technique(t) => run_one_technique(t, &provider, out).await?,
        AppCommand::AllTechniques => {
            for t in Technique::ALL {
                run_one_technique(t, &provider, out).await?;
            }
        }
        AppCommand::Chat => {
            let invoker = PromptInvoker::new(provider, ModelConfig::from_env(CHAT_DEFAULTS));
            let mut session = ChatSession::new(invoker);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            run_chat(&mut session, stdin, out).await?;
        }
        AppCommand::Summarize => {
            let invoker = PromptInvoker::new(provider, ModelConfig::from_env(SUMMARY_DEFAULTS));
            run_summary(invoker, out).await?;
        }
        AppCommand::Cobol { input, output } => {
            let invoker = PromptInvoker::new(provider, ModelConfig::from_env(CONVERT_DEFAULTS));
            run_cobol(&invoker, &input, &output, out).await?;
        }
        AppCommand::Crew { data_dir } => {
            let invoker = PromptInvoker::new(provider, ModelConfig::from_env(CREW_DEFAULTS));
            run_crew(&invoker, &data_dir, out).await?;
        }
        AppCommand::Help => print_usage(None, out)?,
        AppCommand::Unknown(msg) => print_usage(Some(&msg), out)?,
    }
    Ok(())
}

pub fn print_usage<W: Write>(unknown: Option<&str>, out: &mut W) -> std::io::Result<()> {
    if let Some(msg) = unknown {
        writeln!(out, "{}", msg)?;
    }
    writeln!(out, "{}", USAGE)
}

async fn run_one_technique<P, W>(t: Technique, provider: &P, out: &mut W) -> anyhow::Result<()>
where
    P: LlmProvider + Clone,
    W: Write,
{
    match t.demo() {
        Ok(demo) => {
            let config = ModelConfig::from_env(demo.defaults).with_stop(demo.stop.clone());
            let invoker = PromptInvoker::new(provider.clone(), config);
            run_technique(&invoker, &demo, out).await?;
        }
        Err(e) => writeln!(out, "{}", error_text(&e))?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::invoker::testing::ScriptedProvider;
    use crate::ai::LlmError;

    fn invoker(provider: ScriptedProvider, t: Technique) -> PromptInvoker<ScriptedProvider> {
        PromptInvoker::new(provider, ModelConfig::from(t.defaults()))
    }

    #[tokio::test]
    async fn test_template_demo_output() {
        let demo = Technique::Template.demo().unwrap();
        let provider = ScriptedProvider::replying(["  Traduce: ¿Cómo estás?  "]);
        let mut out = Vec::new();
        run_technique(&invoker(provider.clone(), Technique::Template), &demo, &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert_eq!(
            printed,
            "Example: Template-Based Prompting\n\
             Prompt Template: Translate the following {source_language} sentence to {target_language}: {sentence}\n\
             Model's Response: Traduce: ¿Cómo estás?\n\n"
        );
        assert_eq!(
            provider.requests()[0].messages[0].content,
            "Translate the following English sentence to Spanish: How are you?"
        );
    }

    #[tokio::test]
    async fn test_simple_demo_keeps_whitespace_and_reports_errors() {
        let demo = Technique::Simple.demo().unwrap();
        let provider = ScriptedProvider::new([
            Ok(" AI is... ".to_string()),
            Err(LlmError::Timeout),
            Ok("ML".to_string()),
        ]);
        let mut out = Vec::new();
        run_technique(&invoker(provider, Technique::Simple), &demo, &mut out)
            .await
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Example 1: Simple Question\nResponse:  AI is... \n\n"));
        assert!(printed.contains("Example 2: Role-based Prompt\nResponse: Error: request timed out\n"));
        assert!(printed.ends_with("Example 3: Structured Prompt\nResponse: ML\n\n"));
    }

    #[tokio::test]
    async fn test_summary_prints_sections() {
        let provider = ScriptedProvider::replying(["AI imitates human intelligence."]);
        let mut out = Vec::new();
        run_summary(
            PromptInvoker::new(provider, ModelConfig::from(SUMMARY_DEFAULTS)),
            &mut out,
        )
        .await
        .unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Original Text:\n"));
        assert!(printed.contains("\nGenerating summary...\n"));
        assert!(printed.ends_with("\nSummary:\nAI imitates human intelligence.\n"));
    }

    #[tokio::test]
    async fn test_cobol_missing_input_prints_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut out = Vec::new();
        run_cobol(
            &PromptInvoker::new(
                ScriptedProvider::replying(["unused"]),
                ModelConfig::from(CONVERT_DEFAULTS),
            ),
            &dir.path().join("sample.cbl"),
            &dir.path().join("java_ai.java"),
            &mut out,
        )
        .await
        .unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("\nError: could not read"));
    }

    #[tokio::test]
    async fn test_crew_reports_each_task_and_final_result() {
        let dir = tempfile::tempdir().unwrap();
        for (name, body) in [
            ("source1.json", r#"[{"id": 1}]"#),
            ("source2.json", r#"[{"id": 1, "email": "a@b.c"}]"#),
            ("target_schema.json", r#"{"type": "array"}"#),
        ] {
            tokio::fs::write(dir.path().join(name), body).await.unwrap();
        }
        let provider = ScriptedProvider::replying([
            r#"[{"id": 1, "email": "a@b.c"}]"#,
            r#"{"valid": true}"#,
        ]);
        let mut out = Vec::new();
        run_crew(
            &PromptInvoker::new(provider, ModelConfig::from(CREW_DEFAULTS)),
            dir.path(),
            &mut out,
        )
        .await
        .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("[Data Processor] Process data from "));
        assert!(printed.contains("[Data Verifier] Verify the "));
        assert!(printed.contains("processed_output.json\n"));
        assert!(printed.contains("\nFinal Result:\n"));
        assert!(printed.trim_end().ends_with('}'));
    }

    #[tokio::test]
    async fn test_help_and_unknown_print_usage() {
        let mut out = Vec::new();
        dispatch(
            AppCommand::Unknown("未知示例: nope".into()),
            ScriptedProvider::default(),
            &mut out,
        )
        .await
        .unwrap();
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("未知示例: nope\n"));
        assert!(printed.contains("chain-of-thought"));
    }
}
