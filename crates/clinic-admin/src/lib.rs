//! # 诊所系统管理模块
//!
//! 提供配置管理与日志初始化：
//! - 分层配置：内置默认值、TOML配置文件、`CLINIC__` 前缀的环境变量
//! - 配置验证：数据目录与文件名的合法性检查
//! - 日志：基于 `tracing-subscriber` 的统一初始化

pub mod config;
pub mod logging;

pub use self::config::{ClinicConfig, ConfigValidator, LoggingConfig, StorageConfig, SymptomConfig};
pub use self::logging::init_logging;
