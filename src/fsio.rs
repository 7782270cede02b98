use log::info;
use std::path::{Path, PathBuf};

#[derive(thiserror::Error, Debug)]
pub enum FileError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub async fn read_text(path: impl AsRef<Path>) -> Result<String, FileError> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| FileError::Read {
            path: path.to_path_buf(),
            source,
        })?;
    info!("读取文件 {} ({} 字节)", path.display(), content.len());
    Ok(content)
}

/// 父目录不存在时一并创建
pub async fn write_text(path: impl AsRef<Path>, content: &str) -> Result<(), FileError> {
    let path = path.as_ref();
    let wrap = |source| FileError::Write {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(wrap)?;
    }
    tokio::fs::write(path, content).await.map_err(wrap)?;
    info!("写入文件 {} ({} 字节)", path.display(), content.len());
    Ok(())
}
