//! 诊所记录与调度工具主程序

mod cli;
mod commands;

use anyhow::Result;
use clap::Parser;
use clinic_admin::{init_logging, ClinicConfig};
use clinic_scheduling::{ClinicEngine, EnginePaths};
use cli::{Args, Command, ConfigCommand};
use tracing::{debug, error};

/// 由配置得到各数据文件路径
fn engine_paths(config: &ClinicConfig) -> EnginePaths {
    let storage = &config.storage;
    EnginePaths {
        patients: storage.path_of(&storage.patients_file),
        doctors: storage.path_of(&storage.doctors_file),
        staff: storage.path_of(&storage.staff_file),
        appointments: storage.path_of(&storage.appointments_file),
        emergency_cases: storage.path_of(&storage.emergency_cases_file),
        symptoms: config.symptom_catalog_path(),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 初始化配置
    let mut config = ClinicConfig::load(args.config.as_deref())?;
    if let Some(data_dir) = &args.data_dir {
        config.storage.data_dir = data_dir.clone();
    }

    // 初始化日志
    init_logging(&config.logging, args.log_level.as_deref())?;
    debug!("Data directory: {}", config.storage.data_dir);

    // 配置命令不需要加载数据文件
    if let Command::Config { action } = &args.command {
        return run_config_command(action, &config);
    }

    let engine = ClinicEngine::open(&engine_paths(&config));
    if let Err(e) = commands::dispatch(&engine, args.command, args.json).await {
        error!("Command failed: {}", e);
        return Err(e);
    }

    Ok(())
}

fn run_config_command(action: &ConfigCommand, config: &ClinicConfig) -> Result<()> {
    match action {
        ConfigCommand::Init { path, force } => {
            if std::path::Path::new(path).exists() && !force {
                anyhow::bail!("{} already exists, use --force to overwrite", path);
            }
            ClinicConfig::default().write_toml(path)?;
            println!("Default configuration written to {}", path);
        }
        ConfigCommand::Show => print!("{}", config.to_toml()?),
    }
    Ok(())
}
