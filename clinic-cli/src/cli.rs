//! 命令行参数定义
//!
//! 原始输入的格式校验（日期、时间、数字）在这里完成，核心只接收已校验的强类型值。

use chrono::{NaiveDate, NaiveTime};
use clap::{Args as ClapArgs, Parser, Subcommand};
use clinic_core::RecordId;

/// 诊所记录与调度工具
#[derive(Parser, Debug)]
#[command(name = "clinic")]
#[command(about = "Clinic records and scheduling: patients, doctors, staff duty, appointments, emergencies")]
pub struct Args {
    /// 配置文件路径
    #[arg(short, long)]
    pub config: Option<String>,

    /// 数据目录，覆盖配置中的 storage.data_dir
    #[arg(short, long)]
    pub data_dir: Option<String>,

    /// 日志级别，覆盖配置中的 logging.level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// 以JSON输出结果
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// 患者管理
    Patient {
        #[command(subcommand)]
        action: PatientCommand,
    },
    /// 医生管理
    Doctor {
        #[command(subcommand)]
        action: DoctorCommand,
    },
    /// 员工管理与值班轮转
    Staff {
        #[command(subcommand)]
        action: StaffCommand,
    },
    /// 预约调度
    Appointment {
        #[command(subcommand)]
        action: AppointmentCommand,
    },
    /// 急诊病例
    Emergency {
        #[command(subcommand)]
        action: EmergencyCommand,
    },
    /// 系统概览
    Overview,
    /// 配置管理
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
}

#[derive(ClapArgs, Debug)]
pub struct PatientFields {
    #[arg(long)]
    pub name: String,
    #[arg(long)]
    pub age: u32,
    #[arg(long)]
    pub gender: String,
    #[arg(long)]
    pub contact: String,
    #[arg(long, default_value = "")]
    pub history: String,
    #[arg(long, default_value = "")]
    pub symptoms: String,
}

#[derive(Subcommand, Debug)]
pub enum PatientCommand {
    /// 登记新患者
    Add(PatientFields),
    /// 按ID查找患者
    Show { id: RecordId },
    /// 更新患者信息
    Update {
        id: RecordId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        age: Option<u32>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        history: Option<String>,
        #[arg(long)]
        symptoms: Option<String>,
    },
    /// 移除患者
    Remove { id: RecordId },
    /// 列出全部患者
    List,
    /// 显示患者当前症状与已知症状数量
    Symptoms { id: RecordId },
}

#[derive(Subcommand, Debug)]
pub enum DoctorCommand {
    /// 登记新医生
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        specialization: String,
        #[arg(long)]
        experience: u32,
        #[arg(long)]
        contact: String,
        #[arg(long, default_value = "")]
        availability: String,
    },
    Show { id: RecordId },
    Update {
        id: RecordId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        specialization: Option<String>,
        #[arg(long)]
        experience: Option<u32>,
        #[arg(long)]
        contact: Option<String>,
        #[arg(long)]
        availability: Option<String>,
    },
    Remove { id: RecordId },
    List,
    /// 按专科查找
    Search { specialization: String },
}

#[derive(Subcommand, Debug)]
pub enum StaffCommand {
    /// 登记新员工
    Add {
        #[arg(long)]
        name: String,
        /// Morning / Evening / Night
        #[arg(long)]
        shift: String,
        #[arg(long)]
        department: String,
    },
    Show { id: RecordId },
    /// 更新员工信息，不影响值班顺序
    Update {
        id: RecordId,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        shift: Option<String>,
        #[arg(long)]
        department: Option<String>,
    },
    /// 移除员工，同时移出值班轮转
    Remove { id: RecordId },
    List,
    /// 分配下一位值班员工
    Assign,
    /// 显示当前值班顺序
    Roster,
}

#[derive(Subcommand, Debug)]
pub enum AppointmentCommand {
    /// 预约常规门诊
    Regular {
        #[arg(long)]
        patient: RecordId,
        #[arg(long)]
        doctor: RecordId,
        /// DD-MM-YYYY
        #[arg(long, value_parser = parse_date)]
        date: String,
        /// HH:MM
        #[arg(long, value_parser = parse_time)]
        time: String,
    },
    /// 预约急诊，严重程度超出 1-10 时自动夹取
    Emergency {
        #[arg(long)]
        patient: RecordId,
        #[arg(long)]
        doctor: RecordId,
        #[arg(long, value_parser = parse_date)]
        date: String,
        #[arg(long, value_parser = parse_time)]
        time: String,
        #[arg(long, allow_negative_numbers = true)]
        severity: i64,
    },
    /// 处理下一个预约
    Next,
    /// 待处理数量
    Summary,
    /// 按处理顺序列出待处理预约
    List,
}

#[derive(Subcommand, Debug)]
pub enum EmergencyCommand {
    /// 登记急诊病例
    Register {
        #[arg(long)]
        patient: RecordId,
        #[arg(long)]
        symptoms: String,
        #[arg(long, allow_negative_numbers = true)]
        criticality: i64,
        /// HH:MM，缺省为当前时间
        #[arg(long, value_parser = parse_time)]
        arrival: Option<String>,
    },
    /// 接诊最危急的病例
    Attend,
    /// 按危急程度列出待处理病例
    List,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 写出默认配置文件
    Init {
        #[arg(default_value = "clinic.toml")]
        path: String,
        /// 覆盖已存在的文件
        #[arg(long)]
        force: bool,
    },
    /// 显示生效的配置
    Show,
}

/// 校验 `DD-MM-YYYY` 日期，原样保留输入文本
pub fn parse_date(value: &str) -> Result<String, String> {
    NaiveDate::parse_from_str(value, "%d-%m-%Y")
        .map(|_| value.to_string())
        .map_err(|e| format!("expected DD-MM-YYYY: {}", e))
}

/// 校验 `HH:MM` 时间，原样保留输入文本
pub fn parse_time(value: &str) -> Result<String, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .map(|_| value.to_string())
        .map_err(|e| format!("expected HH:MM: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_date_and_time_validation() {
        assert_eq!(parse_date("05-05-2025").unwrap(), "05-05-2025");
        assert!(parse_date("2025-05-05").is_err());
        assert!(parse_date("31-02-2025").is_err());
        assert_eq!(parse_time("09:30").unwrap(), "09:30");
        assert!(parse_time("25:00").is_err());
    }

    #[test]
    fn test_negative_severity_accepted() {
        let args = Args::try_parse_from([
            "clinic",
            "appointment",
            "emergency",
            "--patient",
            "1",
            "--doctor",
            "2",
            "--date",
            "01-01-2025",
            "--time",
            "08:00",
            "--severity",
            "-5",
        ])
        .unwrap();

        match args.command {
            Command::Appointment {
                action: AppointmentCommand::Emergency { severity, .. },
            } => assert_eq!(severity, -5),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
