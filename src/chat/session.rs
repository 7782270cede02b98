use crate::ai::invoker::error_text;
use crate::ai::{ChatMessage, ChatRole, LlmError, LlmProvider, PromptInvoker};
use crate::config::{ModelDefaults, NANO_MODEL};
use log::{info, warn};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

pub const SYSTEM_PROMPT: &str = "You are a helpful AI assistant.";
pub const CHAT_DEFAULTS: ModelDefaults = ModelDefaults::new(NANO_MODEL, 0.7, Some(150));

#[derive(PartialEq, Debug, Clone, Copy)]
pub enum ChatState {
    AwaitingInput,
    Terminated,
}

#[derive(PartialEq, Debug, Clone)]
pub enum Turn {
    Reply(String),
    Failed(String),
    Quit,
}

/// 不裁剪空白，仅忽略大小写
pub fn is_quit(input: &str) -> bool {
    input.to_lowercase() == "quit"
}

pub struct ChatSession<P: LlmProvider> {
    invoker: PromptInvoker<P>,
    messages: Vec<ChatMessage>,
    state: ChatState,
}

impl<P: LlmProvider> ChatSession<P> {
    pub fn new(invoker: PromptInvoker<P>) -> Self {
        Self {
            invoker,
            messages: vec![ChatMessage::system(SYSTEM_PROMPT)],
            state: ChatState::AwaitingInput,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    /// 角色交替由调用方保证，这里只追加
    pub fn add_message(&mut self, role: ChatRole, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    pub async fn get_response(&self) -> Result<String, LlmError> {
        self.invoker.chat(self.messages.clone()).await
    }

    pub async fn handle_input(&mut self, input: &str) -> Turn {
        if self.state == ChatState::Terminated || is_quit(input) {
            self.state = ChatState::Terminated;
            return Turn::Quit;
        }

        self.add_message(ChatRole::User, input);
        match self.get_response().await {
            Ok(reply) => {
                self.add_message(ChatRole::Assistant, reply.clone());
                Turn::Reply(reply)
            }
            Err(e) => {
                // 失败时回滚本轮 user 消息，保持历史不变
                self.messages.pop();
                warn!("对话轮次失败，已回滚: {}", e);
                Turn::Failed(error_text(&e))
            }
        }
    }
}

/// 读取到 "quit" 或 EOF 为止
pub async fn run_chat<P, R, W>(
    session: &mut ChatSession<P>,
    reader: R,
    out: &mut W,
) -> std::io::Result<()>
where
    P: LlmProvider,
    R: AsyncBufRead + Unpin,
    W: Write,
{
    writeln!(out, "Starting chat session (type 'quit' to exit)")?;
    writeln!(out, "{}", "-".repeat(50))?;

    let mut lines = reader.lines();
    while session.state() == ChatState::AwaitingInput {
        write!(out, "\nYou: ")?;
        out.flush()?;

        let Some(line) = lines.next_line().await? else {
            info!("输入结束，退出对话");
            break;
        };

        match session.handle_input(&line).await {
            Turn::Quit => {}
            Turn::Reply(text) | Turn::Failed(text) => {
                writeln!(out, "\nAssistant: {}", text)?;
            }
        }
    }

    info!("对话结束，共 {} 条消息", session.messages().len());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::invoker::testing::ScriptedProvider;
    use crate::config::ModelConfig;

    fn session(provider: ScriptedProvider) -> ChatSession<ScriptedProvider> {
        ChatSession::new(PromptInvoker::new(provider, ModelConfig::from(CHAT_DEFAULTS)))
    }

    #[tokio::test]
    async fn test_successful_exchange_adds_two_messages() {
        let provider = ScriptedProvider::replying(["Hello!", "Paris."]);
        let mut chat = session(provider.clone());
        assert_eq!(chat.messages().len(), 1);

        assert_eq!(chat.handle_input("hi").await, Turn::Reply("Hello!".into()));
        assert_eq!(chat.messages().len(), 3);
        assert_eq!(chat.handle_input("capital of France?").await, Turn::Reply("Paris.".into()));
        assert_eq!(chat.messages().len(), 5);
        assert_eq!(chat.state(), ChatState::AwaitingInput);

        // 第二次请求携带完整历史
        let reqs = provider.requests();
        assert_eq!(reqs[1].messages.len(), 4);
        assert_eq!(reqs[1].messages[0], ChatMessage::system(SYSTEM_PROMPT));
        assert_eq!(reqs[1].messages[2], ChatMessage::assistant("Hello!"));
    }

    #[tokio::test]
    async fn test_quit_is_terminal() {
        let mut chat = session(ScriptedProvider::replying(["unused"]));
        assert_eq!(chat.handle_input("QUIT").await, Turn::Quit);
        assert_eq!(chat.state(), ChatState::Terminated);
        assert_eq!(chat.handle_input("hello?").await, Turn::Quit);
        assert_eq!(chat.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_padded_quit_is_an_ordinary_message() {
        let provider = ScriptedProvider::replying(["Still here."]);
        let mut chat = session(provider.clone());
        assert_eq!(chat.handle_input(" quit ").await, Turn::Reply("Still here.".into()));
        assert_eq!(chat.state(), ChatState::AwaitingInput);
        assert_eq!(provider.requests()[0].messages[1], ChatMessage::user(" quit "));
    }

    #[tokio::test]
    async fn test_failed_exchange_rolls_back() {
        let provider = ScriptedProvider::new([Err(LlmError::Unauthorized("bad key".into()))]);
        let mut chat = session(provider);
        match chat.handle_input("hi").await {
            Turn::Failed(text) => assert!(text.starts_with("Error:")),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(chat.state(), ChatState::AwaitingInput);
    }

    #[tokio::test]
    async fn test_run_chat_until_quit() {
        let provider = ScriptedProvider::replying(["Hi there!"]);
        let mut chat = session(provider.clone());
        let input: &[u8] = b"hello\nquit\nnever read\n";
        let mut out = Vec::new();

        run_chat(&mut chat, input, &mut out).await.unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Starting chat session (type 'quit' to exit)"));
        assert!(printed.contains("\nAssistant: Hi there!\n"));
        assert_eq!(provider.requests().len(), 1);
        assert_eq!(chat.messages().len(), 3);
    }

    #[tokio::test]
    async fn test_run_chat_stops_at_eof() {
        let mut chat = session(ScriptedProvider::replying(["one"]));
        let input: &[u8] = b"only line";
        let mut out = Vec::new();
        run_chat(&mut chat, input, &mut out).await.unwrap();
        assert_eq!(chat.messages().len(), 3);
    }
}
