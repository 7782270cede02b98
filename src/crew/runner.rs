use crate::ai::{ChatMessage, LlmError, LlmProvider, PromptInvoker};
use crate::crew::agent::{Agent, OutputFormat, Task};
use crate::fsio::{read_text, write_text, FileError};
use crate::prompt::parser::extract_json;
use log::{info, warn};
use std::fmt;
use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum CrewError {
    #[error("task {task} is assigned to unknown agent '{role}'")]
    UnknownAgent { task: usize, role: String },
    #[error(transparent)]
    File(#[from] FileError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("task {task} produced malformed output: {reason}")]
    MalformedOutput { task: usize, reason: String },
}

#[derive(Clone, Debug)]
pub struct TaskOutput {
    pub agent: String,
    pub description: String,
    pub raw: String,
    pub written_to: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct CrewOutput {
    pub tasks_output: Vec<TaskOutput>,
    pub raw: String,
}

impl fmt::Display for CrewOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// 顺序执行：每个任务由其 agent 完成，上一个任务的输出作为下一个的上下文
pub struct Crew {
    pub agents: Vec<Agent>,
    pub tasks: Vec<Task>,
}

impl Crew {
    pub fn new(agents: Vec<Agent>, tasks: Vec<Task>) -> Self {
        Self { agents, tasks }
    }

    fn agent_for(&self, idx: usize, task: &Task) -> Result<&Agent, CrewError> {
        self.agents
            .iter()
            .find(|a| a.role == task.agent)
            .ok_or_else(|| CrewError::UnknownAgent {
                task: idx,
                role: task.agent.clone(),
            })
    }

    pub async fn kickoff<P: LlmProvider>(
        &self,
        invoker: &PromptInvoker<P>,
    ) -> Result<CrewOutput, CrewError> {
        // 先校验全部分配，避免跑到一半才失败
        for (idx, task) in self.tasks.iter().enumerate() {
            self.agent_for(idx, task)?;
        }

        let mut outputs: Vec<TaskOutput> = Vec::with_capacity(self.tasks.len());
        for (idx, task) in self.tasks.iter().enumerate() {
            let agent = self.agent_for(idx, task)?;
            info!("▶ 任务 {} 开始 [{}]", idx + 1, agent.role);

            let mut files = Vec::with_capacity(task.inputs.len());
            for path in &task.inputs {
                let content = read_text(path).await?;
                files.push((path.clone(), content));
            }

            // 上一任务的输出文件若已在本任务输入中，不再重复附带
            let context = outputs
                .last()
                .filter(|prev| {
                    prev.written_to
                        .as_ref()
                        .map_or(true, |path| !task.inputs.contains(path))
                })
                .map(|o| o.raw.as_str());
            let prompt = task.render_prompt(context, &files);
            let reply = invoker
                .chat(vec![
                    ChatMessage::system(agent.system_prompt()),
                    ChatMessage::user(prompt),
                ])
                .await?;

            let (raw, written_to) = match &task.output {
                Some((path, format)) => {
                    let body = finalize(idx, &reply, *format)?;
                    write_text(path, &body).await?;
                    (body, Some(path.clone()))
                }
                None => (reply.trim().to_string(), None),
            };

            info!("✓ 任务 {} 完成 [{}]", idx + 1, agent.role);
            outputs.push(TaskOutput {
                agent: agent.role.clone(),
                description: task.description.clone(),
                raw,
                written_to,
            });
        }

        let raw = outputs.last().map(|o| o.raw.clone()).unwrap_or_default();
        Ok(CrewOutput {
            tasks_output: outputs,
            raw,
        })
    }
}

fn finalize(idx: usize, reply: &str, format: OutputFormat) -> Result<String, CrewError> {
    match format {
        OutputFormat::Text => Ok(reply.trim().to_string()),
        OutputFormat::Json => {
            let value = extract_json(reply).ok_or_else(|| {
                warn!("✗ 任务 {} 输出不是合法 JSON", idx + 1);
                CrewError::MalformedOutput {
                    task: idx,
                    reason: "reply is not valid JSON".to_string(),
                }
            })?;
            serde_json::to_string_pretty(&value).map_err(|e| CrewError::MalformedOutput {
                task: idx,
                reason: e.to_string(),
            })
        }
    }
}
