use crate::convert::{DEFAULT_INPUT, DEFAULT_OUTPUT};
use crate::crew::json_pipeline::DEFAULT_DATA_DIR;
use crate::prompt::Technique;
use std::path::PathBuf;
use std::str::FromStr;

pub const USAGE: &str = "用法: prompt-lab <example> [args]

examples:
  simple | zero-shot | few-shot | chain-of-thought | role | contrastive
  template | retrieval-augmented | context | instruction | demonstration
  techniques                    run every technique above in order
  chat                          interactive chat, type 'quit' to exit
  summarize                     summary chain over a sample text
  cobol [input] [output]        COBOL -> Java (default sample.cbl -> java_ai.java)
  crew [data_dir]               two-agent JSON combine + verify (default data/)
  help";

#[derive(Debug, Clone, PartialEq)]
pub enum AppCommand {
    Technique(Technique),
    AllTechniques,
    Chat,
    Summarize,
    Cobol { input: PathBuf, output: PathBuf },
    Crew { data_dir: PathBuf },
    Help,
    Unknown(String),
}

impl AppCommand {
    /// argv 已由 shell 切分，路径里的空格原样保留
    pub fn from_args<S: AsRef<str>>(args: &[S]) -> Self {
        let Some(first) = args.first() else {
            return AppCommand::Help;
        };
        let arg = |i: usize, default: &str| {
            PathBuf::from(args.get(i).map(|s| s.as_ref()).unwrap_or(default))
        };

        let cmd = first.as_ref().to_ascii_lowercase();
        match cmd.as_str() {
            "techniques" | "all" => AppCommand::AllTechniques,
            "chat" => AppCommand::Chat,
            "summarize" | "summary" | "chain" => AppCommand::Summarize,
            "cobol" | "cobol-to-java" => AppCommand::Cobol {
                input: arg(1, DEFAULT_INPUT),
                output: arg(2, DEFAULT_OUTPUT),
            },
            "crew" | "agents" => AppCommand::Crew {
                data_dir: arg(1, DEFAULT_DATA_DIR),
            },
            "help" | "h" | "-h" | "--help" => AppCommand::Help,
            other => match other.parse::<Technique>() {
                Ok(t) => AppCommand::Technique(t),
                Err(_) => AppCommand::Unknown(format!("未知示例: {}", first.as_ref())),
            },
        }
    }
}

/// 单行命令（按空白切分），路径中不能含空格
impl FromStr for AppCommand {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split_whitespace().collect();
        Ok(AppCommand::from_args(parts.as_slice()))
    }
}
