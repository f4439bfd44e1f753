//! 两级优先级调度器
//!
//! 常规工作进先进先出队列，紧急工作进按严重程度排序的最大堆。
//! 只要堆非空，下一项总是取自堆，与常规队列中的等待时间无关。

use clinic_core::{ClinicError, Result, Severity};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BinaryHeap, VecDeque};

/// 出队结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scheduled<T> {
    Urgent { item: T, priority: Severity },
    Routine(T),
}

impl<T> Scheduled<T> {
    pub fn item(&self) -> &T {
        match self {
            Scheduled::Urgent { item, .. } => item,
            Scheduled::Routine(item) => item,
        }
    }

    pub fn into_item(self) -> T {
        match self {
            Scheduled::Urgent { item, .. } => item,
            Scheduled::Routine(item) => item,
        }
    }

    pub fn priority(&self) -> Option<Severity> {
        match self {
            Scheduled::Urgent { priority, .. } => Some(*priority),
            Scheduled::Routine(_) => None,
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, Scheduled::Urgent { .. })
    }
}

/// 待处理数量统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueSummary {
    pub urgent: usize,
    pub routine: usize,
}

/// 堆中的条目
///
/// 先比较优先级；优先级相同时序号小（先到）的先出。
#[derive(Debug, Clone)]
struct UrgentEntry<T> {
    priority: Severity,
    seq: u64,
    item: T,
}

impl<T> PartialEq for UrgentEntry<T> {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl<T> Eq for UrgentEntry<T> {}

impl<T> PartialOrd for UrgentEntry<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for UrgentEntry<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            ordering => ordering,
        }
    }
}

/// 优先级调度器（纯内存）
#[derive(Debug, Clone)]
pub struct PriorityScheduler<T> {
    routine: VecDeque<T>,
    urgent: BinaryHeap<UrgentEntry<T>>,
    next_seq: u64,
}

impl<T> Default for PriorityScheduler<T> {
    fn default() -> Self {
        Self {
            routine: VecDeque::new(),
            urgent: BinaryHeap::new(),
            next_seq: 0,
        }
    }
}

impl<T> PriorityScheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// 常规项加入队尾
    pub fn schedule_routine(&mut self, item: T) {
        self.routine.push_back(item);
    }

    /// 紧急项入堆，优先级夹取到 [1,10]，返回实际使用的优先级
    pub fn schedule_urgent(&mut self, item: T, priority: i64) -> Severity {
        let priority = Severity::clamped(priority);
        let seq = self.next_seq;
        self.next_seq += 1;
        self.urgent.push(UrgentEntry {
            priority,
            seq,
            item,
        });
        priority
    }

    /// 取出下一项：堆优先，其次常规队列，都为空时返回 Empty
    pub fn next(&mut self) -> Result<Scheduled<T>> {
        if let Some(entry) = self.urgent.pop() {
            return Ok(Scheduled::Urgent {
                item: entry.item,
                priority: entry.priority,
            });
        }
        self.routine
            .pop_front()
            .map(Scheduled::Routine)
            .ok_or_else(|| ClinicError::Empty("no items pending".to_string()))
    }

    /// 把刚取出的项放回队首（持久化失败时回滚用）
    pub(crate) fn restore(&mut self, scheduled: Scheduled<T>) {
        match scheduled {
            Scheduled::Urgent { item, priority } => {
                let seq = self.front_seq(priority);
                self.urgent.push(UrgentEntry {
                    priority,
                    seq,
                    item,
                });
            }
            Scheduled::Routine(item) => self.routine.push_front(item),
        }
    }

    /// 比同优先级已有条目都更靠前的序号
    fn front_seq(&self, priority: Severity) -> u64 {
        self.urgent
            .iter()
            .filter(|e| e.priority == priority)
            .map(|e| e.seq)
            .min()
            .map(|seq| seq.saturating_sub(1))
            .unwrap_or(0)
    }

    pub fn summary(&self) -> QueueSummary {
        QueueSummary {
            urgent: self.urgent.len(),
            routine: self.routine.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.urgent.is_empty() && self.routine.is_empty()
    }

    /// 紧急项按出队顺序排列的只读视图
    pub fn urgent_snapshot(&self) -> Vec<(Severity, &T)> {
        let mut entries: Vec<&UrgentEntry<T>> = self.urgent.iter().collect();
        entries.sort_by(|a, b| b.cmp(a));
        entries.into_iter().map(|e| (e.priority, &e.item)).collect()
    }

    /// 常规项按出队顺序排列的只读视图
    pub fn routine_snapshot(&self) -> Vec<&T> {
        self.routine.iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urgent_preempts_routine() {
        let mut scheduler = PriorityScheduler::new();
        scheduler.schedule_urgent("sev3", 3);
        scheduler.schedule_urgent("sev9", 9);
        scheduler.schedule_routine("regular");

        let first = scheduler.next().unwrap();
        assert_eq!(first.priority().map(Severity::value), Some(9));
        assert_eq!(*first.item(), "sev9");
        assert_eq!(*scheduler.next().unwrap().item(), "sev3");
        assert_eq!(scheduler.next().unwrap(), Scheduled::Routine("regular"));
        assert!(scheduler.next().unwrap_err().is_empty());
    }

    #[test]
    fn test_routine_never_returned_while_urgent_pending() {
        let mut scheduler = PriorityScheduler::new();
        let mut expected_urgent = 0;
        for i in 0..20i64 {
            if i % 3 == 0 {
                scheduler.schedule_urgent(i, i % 10);
                expected_urgent += 1;
            } else {
                scheduler.schedule_routine(i);
            }
        }

        let mut seen_routine = false;
        while let Ok(next) = scheduler.next() {
            if next.is_urgent() {
                assert!(!seen_routine, "urgent item dispatched after a routine item");
                expected_urgent -= 1;
            } else {
                seen_routine = true;
            }
        }
        assert_eq!(expected_urgent, 0);
    }

    #[test]
    fn test_priority_clamping() {
        let mut scheduler = PriorityScheduler::new();
        assert_eq!(scheduler.schedule_urgent("low", -5).value(), 1);
        assert_eq!(scheduler.schedule_urgent("high", 50).value(), 10);

        let snapshot = scheduler.urgent_snapshot();
        assert_eq!(snapshot[0], (Severity::clamped(10), &"high"));
        assert_eq!(snapshot[1], (Severity::clamped(1), &"low"));
    }

    #[test]
    fn test_equal_priorities_dispatch_in_arrival_order() {
        let mut scheduler = PriorityScheduler::new();
        scheduler.schedule_urgent("first", 2);
        scheduler.schedule_urgent("second", 2);
        scheduler.schedule_urgent("critical", 8);

        let order: Vec<_> = std::iter::from_fn(|| scheduler.next().ok())
            .map(Scheduled::into_item)
            .collect();
        assert_eq!(order, vec!["critical", "first", "second"]);
    }

    #[test]
    fn test_snapshots_do_not_mutate() {
        let mut scheduler = PriorityScheduler::new();
        scheduler.schedule_routine("r1");
        scheduler.schedule_routine("r2");
        scheduler.schedule_urgent("u", 5);

        assert_eq!(scheduler.routine_snapshot(), vec![&"r1", &"r2"]);
        assert_eq!(scheduler.urgent_snapshot().len(), 1);
        assert_eq!(scheduler.summary(), QueueSummary { urgent: 1, routine: 2 });
    }

    #[test]
    fn test_restore_puts_item_back_in_front() {
        let mut scheduler = PriorityScheduler::new();
        scheduler.schedule_urgent("a", 4);
        scheduler.schedule_urgent("b", 4);
        scheduler.schedule_routine("r");

        let popped = scheduler.next().unwrap();
        scheduler.restore(popped);
        assert_eq!(*scheduler.next().unwrap().item(), "a");
        assert_eq!(*scheduler.next().unwrap().item(), "b");

        let popped = scheduler.next().unwrap();
        scheduler.restore(popped);
        assert_eq!(scheduler.next().unwrap(), Scheduled::Routine("r"));
    }
}
