use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq)]
pub struct Agent {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl Agent {
    pub fn new(role: impl Into<String>, goal: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            goal: goal.into(),
            backstory: backstory.into(),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

/// 任务输出文件的格式；Json 会校验并格式化后写入
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Debug)]
pub struct Task {
    pub description: String,
    pub expected_output: String,
    /// 执行该任务的 agent 的 role
    pub agent: String,
    pub inputs: Vec<PathBuf>,
    pub output: Option<(PathBuf, OutputFormat)>,
}

impl Task {
    pub fn new(
        description: impl Into<String>,
        expected_output: impl Into<String>,
        agent: &Agent,
    ) -> Self {
        Self {
            description: description.into(),
            expected_output: expected_output.into(),
            agent: agent.role.clone(),
            inputs: Vec::new(),
            output: None,
        }
    }

    pub fn reads(mut self, path: impl Into<PathBuf>) -> Self {
        self.inputs.push(path.into());
        self
    }

    pub fn writes(mut self, path: impl Into<PathBuf>, format: OutputFormat) -> Self {
        self.output = Some((path.into(), format));
        self
    }

    /// 描述 + 期望输出 + 上一任务结果 + 输入文件内容
    pub fn render_prompt(&self, context: Option<&str>, files: &[(PathBuf, String)]) -> String {
        let mut lines = Vec::new();
        lines.push(self.description.trim().to_string());
        lines.push("".to_string());
        lines.push(format!(
            "This is the expected criteria for your final answer: {}",
            self.expected_output
        ));
        if let Some((path, format)) = &self.output {
            lines.push(format!(
                "Your final answer is written verbatim to {}.",
                path.display()
            ));
            if *format == OutputFormat::Json {
                lines.push(
                    "Respond with valid JSON only. No markdown, no explanations.".to_string(),
                );
            }
        }

        if let Some(ctx) = context.filter(|c| !c.trim().is_empty()) {
            lines.push("".to_string());
            lines.push("This is the context you're working with:".to_string());
            lines.push(ctx.trim().to_string());
        }

        for (path, content) in files {
            lines.push("".to_string());
            lines.push(format!("--- {} ---", path.display()));
            lines.push(content.trim_end().to_string());
        }

        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_mentions_role_goal_backstory() {
        let a = Agent::new("Data Verifier", "Verify data", "You are meticulous.");
        let p = a.system_prompt();
        assert!(p.starts_with("You are Data Verifier. You are meticulous."));
        assert!(p.ends_with("Your personal goal is: Verify data"));
    }

    #[test]
    fn render_prompt_inlines_context_and_files() {
        let a = Agent::new("Data Processor", "g", "b");
        let t = Task::new("Combine the files.", "A JSON file.", &a)
            .reads("data/source1.json")
            .writes("data/out.json", OutputFormat::Json);
        assert_eq!(t.agent, "Data Processor");

        let p = t.render_prompt(
            Some("previous answer"),
            &[(PathBuf::from("data/source1.json"), "{\"id\": 1}\n".to_string())],
        );
        assert!(p.starts_with("Combine the files.\n\nThis is the expected criteria for your final answer: A JSON file."));
        assert!(p.contains("Respond with valid JSON only."));
        assert!(p.contains("This is the context you're working with:\nprevious answer"));
        assert!(p.ends_with("--- data/source1.json ---\n{\"id\": 1}"));
    }

    #[test]
    fn render_prompt_skips_empty_context() {
        let a = Agent::new("r", "g", "b");
        let t = Task::new("Do it.", "Done.", &a);
        let p = t.render_prompt(Some("   "), &[]);
        assert!(!p.contains("context"));
        assert!(!p.contains("JSON"));
    }
}
