//! 持久化调度簿
//!
//! 在优先级调度器外包一层平面文件：每次变更后整文件重写，
//! 先写紧急项（按出队顺序），再写常规项（按先进先出顺序）。

use crate::priority::{PriorityScheduler, QueueSummary, Scheduled};
use clinic_core::persistence::FlatFile;
use clinic_core::{Result, Severity};
use std::path::PathBuf;
use tracing::{debug, error};

/// 调度项的行编解码
pub trait ScheduleCodec {
    type Item: Clone + std::fmt::Debug;

    /// 用于日志
    const KIND: &'static str;

    const HEADER: &'static str;

    /// 编码一行；`priority` 为 `None` 表示常规项
    fn encode(item: &Self::Item, priority: Option<Severity>) -> Vec<String>;

    /// 解码一行；返回的优先级为 `Some` 时进堆，否则进常规队列
    fn decode(fields: &[String]) -> (Self::Item, Option<Severity>);
}

/// 持久化调度簿
#[derive(Debug)]
pub struct ScheduleBook<C: ScheduleCodec> {
    file: FlatFile,
    scheduler: PriorityScheduler<C::Item>,
}

impl<C: ScheduleCodec> ScheduleBook<C> {
    /// 打开并加载调度文件，按文件顺序重新入队
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let file = FlatFile::new(path, C::HEADER);
        let mut scheduler = PriorityScheduler::new();

        for fields in file.load_rows() {
            match C::decode(&fields) {
                (item, Some(priority)) => {
                    scheduler.schedule_urgent(item, i64::from(priority.value()));
                }
                (item, None) => scheduler.schedule_routine(item),
            }
        }

        let summary = scheduler.summary();
        debug!(
            "Loaded {} schedule: {} urgent, {} routine",
            C::KIND,
            summary.urgent,
            summary.routine
        );

        Self { file, scheduler }
    }

    /// 整文件重写
    pub fn save(&self) -> Result<()> {
        let urgent = self
            .scheduler
            .urgent_snapshot()
            .into_iter()
            .map(|(priority, item)| C::encode(item, Some(priority)));
        let routine = self
            .scheduler
            .routine_snapshot()
            .into_iter()
            .map(|item| C::encode(item, None));

        self.file.rewrite(urgent.chain(routine)).map_err(|e| {
            error!("Failed to persist {} schedule: {}", C::KIND, e);
            e
        })
    }

    pub fn schedule_routine(&mut self, item: C::Item) -> Result<()> {
        self.scheduler.schedule_routine(item);
        self.save()
    }

    /// 紧急项入堆，返回夹取后的优先级
    pub fn schedule_urgent(&mut self, item: C::Item, priority: i64) -> Result<Severity> {
        let priority = self.scheduler.schedule_urgent(item, priority);
        self.save()?;
        Ok(priority)
    }

    /// 取出下一项并持久化
    ///
    /// 写文件失败时该项放回原位并返回错误，内存与文件保持一致。
    pub fn next(&mut self) -> Result<Scheduled<C::Item>> {
        let scheduled = self.scheduler.next()?;
        if let Err(e) = self.save() {
            self.scheduler.restore(scheduled);
            return Err(e);
        }
        Ok(scheduled)
    }

    pub fn summary(&self) -> QueueSummary {
        self.scheduler.summary()
    }

    pub fn urgent_snapshot(&self) -> Vec<(Severity, &C::Item)> {
        self.scheduler.urgent_snapshot()
    }

    pub fn routine_snapshot(&self) -> Vec<&C::Item> {
        self.scheduler.routine_snapshot()
    }
}
