//! # Clinic Core
//!
//! 诊所记录系统的核心模块，提供基础数据结构、错误定义、CSV编解码和平面文件持久化。

pub mod csv;
pub mod error;
pub mod models;
pub mod persistence;

pub use error::{ClinicError, Result};
pub use models::*;
