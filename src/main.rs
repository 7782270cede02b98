mod ai;
mod app_service;
mod chain;
mod chat;
mod commands;
mod config;
mod convert;
mod crew;
mod fsio;
mod prompt;

use chrono::Local;
use log::{error, info};
use std::io;

use crate::ai::invoker::error_text;
use crate::ai::OpenAiProvider;
use crate::commands::AppCommand;

fn init_logging() -> io::Result<()> {
    let ts = Local::now().format("%Y%m%d-%H%M%S").to_string();
    let log_dir = std::path::PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;
    let log_path = log_dir.join(format!("prompt-lab-{}.log", ts));
    let log_file = std::fs::File::create(log_path)?;
    // 日志写文件，stdout 只留示例输出
    log_builder()
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .init();
    Ok(())
}

/// 内置过滤规则在前，RUST_LOG 最后解析，可覆盖默认值
fn log_builder() -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Warn)
        .filter_module("prompt_lab", log::LevelFilter::Info)
        .filter_module("reqwest", log::LevelFilter::Warn)
        .parse_default_env();
    builder
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    init_logging()?;

    match dotenv::dotenv() {
        Ok(path) => info!("✓ 已加载 {}", path.display()),
        Err(_) => info!("未找到 .env 文件，使用系统环境变量"),
    }

    let args: Vec<String> = std::env::args().skip(1).collect();
    let cmd = AppCommand::from_args(&args);
    info!("命令: {:?}", cmd);

    let mut stdout = io::stdout();
    // help 不需要 API key
    match &cmd {
        AppCommand::Help => return Ok(app_service::print_usage(None, &mut stdout)?),
        AppCommand::Unknown(msg) => {
            return Ok(app_service::print_usage(Some(msg), &mut stdout)?)
        }
        _ => {}
    }

    let provider = match OpenAiProvider::from_env() {
        Ok(p) => {
            info!("✓ OpenAI 端点: {}", p.base_url());
            p
        }
        Err(e) => {
            error!("无法创建 OpenAI 客户端: {}", e);
            println!("{}", error_text(&e));
            std::process::exit(1);
        }
    };

    app_service::dispatch(cmd, provider, &mut stdout).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn rust_log_overrides_builtin_filters() {
        std::env::set_var("RUST_LOG", "debug");
        let logger = log_builder().build();
        std::env::remove_var("RUST_LOG");
        assert_eq!(logger.filter(), log::LevelFilter::Debug);
    }

    #[test]
    #[serial]
    fn builtin_filters_apply_without_rust_log() {
        std::env::remove_var("RUST_LOG");
        let logger = log_builder().build();
        assert_eq!(logger.filter(), log::LevelFilter::Info);
    }
}
