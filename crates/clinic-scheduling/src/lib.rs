//! # 调度模块
//!
//! 决定下一条要处理的工作项，包括：
//! - 优先级调度器：常规先进先出队列 + 按严重程度排序的最大堆，堆永远优先
//! - 预约簿：常规预约与急诊预约共用一个调度器和一个文件
//! - 急诊接诊：只有堆的调度器，按危急程度排序
//! - 诊所引擎：为每个存储和调度器加独占锁，提供统一的异步接口

pub mod appointments;
pub mod book;
pub mod emergency;
pub mod engine;
pub mod priority;

// 重新导出主要类型
pub use appointments::{AppointmentBook, NextAppointment};
pub use book::{ScheduleBook, ScheduleCodec};
pub use emergency::EmergencyIntake;
pub use engine::{ClinicEngine, ClinicOverview, EnginePaths};
pub use priority::{PriorityScheduler, QueueSummary, Scheduled};
