//! # 记录管理模块
//!
//! 提供患者、医生、员工三类记录的管理功能，包括：
//! - 通用记录存储：按插入顺序保存、ID自动分配、变更后整文件重写
//! - 值班轮转队列：循环先进先出，保证员工轮流值班
//! - 症状目录：向外部症状检查器暴露已知症状列表

pub mod doctors;
pub mod patients;
pub mod rotation;
pub mod staff;
pub mod store;
pub mod symptoms;

// 重新导出主要类型
pub use doctors::DoctorRegistry;
pub use patients::PatientRegistry;
pub use rotation::RotationQueue;
pub use staff::StaffRoster;
pub use store::{Record, RecordStore};
pub use symptoms::SymptomCatalog;
