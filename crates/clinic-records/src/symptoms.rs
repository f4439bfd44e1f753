//! 症状目录
//!
//! 外部症状检查器使用的已知症状名称列表，顺序与参考数据集一致。

use serde::{Deserialize, Serialize};
use std::path::Path;

/// 已知症状列表
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SymptomCatalog {
    names: Vec<String>,
}

impl SymptomCatalog {
    /// 从参考文件加载，每行一个症状名，跳过空行
    ///
    /// 文件缺失时返回空目录。
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(text) => {
                let catalog = Self::from_lines(&text);
                tracing::debug!("Loaded {} symptom names from {}", catalog.len(), path.display());
                catalog
            }
            Err(e) => {
                tracing::warn!("Symptom list {} unavailable: {}", path.display(), e);
                Self::default()
            }
        }
    }

    pub fn from_lines(text: &str) -> Self {
        let names = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        Self { names }
    }

    /// 有序的症状名称
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}
