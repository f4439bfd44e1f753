//! 配置管理
//!
//! 配置按以下顺序叠加，后者覆盖前者：内置默认值、TOML配置文件、环境变量。

use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// 环境变量前缀，如 `CLINIC__STORAGE__DATA_DIR`
pub const ENV_PREFIX: &str = "CLINIC";

/// 诊所系统完整配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClinicConfig {
    /// 数据文件配置
    pub storage: StorageConfig,
    /// 症状目录配置
    pub symptoms: SymptomConfig,
    /// 日志配置
    pub logging: LoggingConfig,
}

/// 数据文件配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// 数据目录
    pub data_dir: String,
    pub patients_file: String,
    pub doctors_file: String,
    pub staff_file: String,
    pub appointments_file: String,
    pub emergency_cases_file: String,
}

/// 症状目录配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SymptomConfig {
    /// 参考症状列表，相对路径基于数据目录
    pub catalog_file: String,
}

/// 日志配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// 日志过滤表达式，如 `info` 或 `clinic_records=debug`
    pub level: String,
    /// 使用紧凑输出格式
    pub compact: bool,
}

impl StorageConfig {
    /// 数据目录下某个文件的完整路径
    pub fn path_of(&self, file: &str) -> PathBuf {
        Path::new(&self.data_dir).join(file)
    }

    fn file_names(&self) -> [(&'static str, &str); 5] {
        [
            ("storage.patients_file", &self.patients_file),
            ("storage.doctors_file", &self.doctors_file),
            ("storage.staff_file", &self.staff_file),
            ("storage.appointments_file", &self.appointments_file),
            ("storage.emergency_cases_file", &self.emergency_cases_file),
        ]
    }
}

impl ClinicConfig {
    /// 加载配置
    ///
    /// 给出配置文件路径时该文件必须存在。
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let defaults = Config::try_from(&ClinicConfig::default())
            .context("Failed to build default configuration")?;

        let mut builder = Config::builder().add_source(defaults);
        if let Some(path) = config_path {
            debug!("Loading configuration file {}", path);
            builder = builder.add_source(File::with_name(path).required(true));
        }
        builder = builder.add_source(Environment::with_prefix(ENV_PREFIX).separator("__"));

        let settings = builder.build().context("Failed to load configuration")?;
        let config: ClinicConfig = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        ConfigValidator::new().validate(&config)?;
        Ok(config)
    }

    /// 症状目录的完整路径
    pub fn symptom_catalog_path(&self) -> PathBuf {
        let catalog = Path::new(&self.symptoms.catalog_file);
        if catalog.is_absolute() {
            catalog.to_path_buf()
        } else {
            self.storage.path_of(&self.symptoms.catalog_file)
        }
    }

    /// 序列化为TOML文本
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// 写入TOML配置文件
    pub fn write_toml(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        std::fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
        info!("Configuration written to {}", path.display());
        Ok(())
    }
}

/// 验证规则
struct ValidationRule {
    field_path: &'static str,
    validator: fn(&ClinicConfig) -> Result<()>,
}

/// 配置验证器
pub struct ConfigValidator {
    validation_rules: Vec<ValidationRule>,
}

impl ConfigValidator {
    /// 创建新的配置验证器
    pub fn new() -> Self {
        let validation_rules = vec![
            ValidationRule {
                field_path: "storage.data_dir",
                validator: |config| {
                    if config.storage.data_dir.trim().is_empty() {
                        Err(anyhow::anyhow!("Data directory cannot be empty"))
                    } else {
                        Ok(())
                    }
                },
            },
            ValidationRule {
                field_path: "storage.*_file",
                validator: |config| {
                    let mut seen = HashSet::new();
                    for (key, name) in config.storage.file_names() {
                        if name.trim().is_empty() {
                            return Err(anyhow::anyhow!("{} cannot be empty", key));
                        }
                        if !seen.insert(name) {
                            return Err(anyhow::anyhow!("{} duplicates another data file: {}", key, name));
                        }
                    }
                    Ok(())
                },
            },
            ValidationRule {
                field_path: "logging.level",
                validator: |config| {
                    tracing_subscriber::EnvFilter::try_new(&config.logging.level)
                        .map(|_| ())
                        .map_err(|e| anyhow::anyhow!("Invalid log filter {:?}: {}", config.logging.level, e))
                },
            },
        ];

        Self { validation_rules }
    }

    /// 验证配置
    pub fn validate(&self, config: &ClinicConfig) -> Result<()> {
        for rule in &self.validation_rules {
            if let Err(e) = (rule.validator)(config) {
                error!("Configuration validation failed for {}: {}", rule.field_path, e);
                return Err(anyhow::anyhow!("Invalid configuration ({}): {}", rule.field_path, e));
            }
        }

        debug!("Configuration validation passed");
        Ok(())
    }
}

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new()
    }
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            storage: StorageConfig::default(),
            symptoms: SymptomConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "./data".to_string(),
            patients_file: "patients.csv".to_string(),
            doctors_file: "doctors.csv".to_string(),
            staff_file: "staff.csv".to_string(),
            appointments_file: "appointments.csv".to_string(),
            emergency_cases_file: "emergency_cases.csv".to_string(),
        }
    }
}

impl Default for SymptomConfig {
    fn default() -> Self {
        Self {
            catalog_file: "symptoms.txt".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            compact: false,
        }
    }
}
