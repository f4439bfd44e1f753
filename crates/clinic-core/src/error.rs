//! 错误定义模块

use std::path::PathBuf;
use thiserror::Error;

/// 诊所系统统一错误类型
#[derive(Error, Debug)]
pub enum ClinicError {
    #[error("资源未找到: {0}")]
    NotFound(String),

    #[error("队列为空: {0}")]
    Empty(String),

    #[error("文件读写错误 {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("系统内部错误: {0}")]
    Internal(String),
}

impl ClinicError {
    /// 包装带路径的IO错误
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ClinicError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ClinicError::NotFound(_))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ClinicError::Empty(_))
    }
}

/// 诊所系统统一结果类型
pub type Result<T> = std::result::Result<T, ClinicError>;
