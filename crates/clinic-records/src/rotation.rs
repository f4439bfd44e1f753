//! 值班轮转队列
//!
//! 循环先进先出：取出队首后立即放回队尾，实现轮流值班。

use clinic_core::{ClinicError, Result};
use std::collections::VecDeque;

/// 轮转队列
#[derive(Debug, Clone, Default)]
pub struct RotationQueue<T> {
    queue: VecDeque<T>,
}

impl<T: Clone + PartialEq> RotationQueue<T> {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::new(),
        }
    }

    /// 加入队尾
    pub fn enqueue(&mut self, item: T) {
        self.queue.push_back(item);
    }

    /// 分配下一位：取出队首并放回队尾
    ///
    /// 在不增删成员的前提下，任何成员在其他成员各轮到一次之前不会被分配第二次。
    pub fn assign_next(&mut self) -> Result<T> {
        let item = self
            .queue
            .pop_front()
            .ok_or_else(|| ClinicError::Empty("rotation queue is empty".to_string()))?;
        self.queue.push_back(item.clone());
        Ok(item)
    }

    /// 当前轮转顺序的快照，不修改队列
    pub fn snapshot(&self) -> Vec<T> {
        self.queue.iter().cloned().collect()
    }

    /// 移除所有等于 `item` 的成员，返回移除数量
    pub fn purge(&mut self, item: &T) -> usize {
        let before = self.queue.len();
        self.queue.retain(|queued| queued != item);
        before - self.queue.len()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}

impl<T: Clone + PartialEq> FromIterator<T> for RotationQueue<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self {
            queue: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_robin() {
        let mut queue: RotationQueue<&str> = ["A", "B", "C"].into_iter().collect();

        assert_eq!(queue.assign_next().unwrap(), "A");
        assert_eq!(queue.assign_next().unwrap(), "B");
        assert_eq!(queue.assign_next().unwrap(), "C");
        assert_eq!(queue.assign_next().unwrap(), "A");
        assert_eq!(queue.snapshot(), vec!["B", "C", "A"]);
    }

    #[test]
    fn test_each_member_once_per_cycle() {
        let members: Vec<u32> = (1..=7).collect();
        let mut queue: RotationQueue<u32> = members.iter().copied().collect();

        let assigned: Vec<u32> = (0..members.len())
            .map(|_| queue.assign_next().unwrap())
            .collect();
        assert_eq!(assigned, members);
    }

    #[test]
    fn test_empty_queue() {
        let mut queue: RotationQueue<u32> = RotationQueue::new();
        assert!(queue.assign_next().unwrap_err().is_empty());
        assert!(queue.snapshot().is_empty());
    }

    #[test]
    fn test_purge() {
        let mut queue: RotationQueue<u32> = [1, 2, 3].into_iter().collect();
        assert_eq!(queue.purge(&2), 1);
        assert_eq!(queue.purge(&9), 0);
        assert_eq!(queue.snapshot(), vec![1, 3]);
    }
}
