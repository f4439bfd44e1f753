//! 员工管理与值班轮转

use crate::rotation::RotationQueue;
use crate::store::{field, Record, RecordStore};
use clinic_core::csv::parse_u32_lossy;
use clinic_core::{ClinicError, NewStaffMember, RecordId, Result, StaffMember, StaffUpdate};
use std::path::PathBuf;

impl Record for StaffMember {
    type Draft = NewStaffMember;

    const KIND: &'static str = "Staff";
    const HEADER: &'static str = "ID,Name,Shift,Department";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn from_draft(id: RecordId, draft: NewStaffMember) -> Self {
        StaffMember {
            id,
            name: draft.name,
            shift: draft.shift,
            department: draft.department,
        }
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.shift.clone(),
            self.department.clone(),
        ]
    }

    fn from_fields(fields: &[String]) -> Self {
        StaffMember {
            id: parse_u32_lossy(&field(fields, 0)),
            name: field(fields, 1),
            shift: field(fields, 2),
            department: field(fields, 3),
        }
    }
}

/// 员工名册
///
/// 轮转队列只保存员工ID，名册是唯一的所有者。移除员工时同步从轮转中清除。
/// 轮转位置不持久化，启动时按文件顺序重建。
#[derive(Debug)]
pub struct StaffRoster {
    store: RecordStore<StaffMember>,
    rotation: RotationQueue<RecordId>,
}

impl StaffRoster {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let store: RecordStore<StaffMember> = RecordStore::open(path);
        let rotation = store.iter().map(|s| s.id).collect();
        Self { store, rotation }
    }

    /// 登记新员工并加入轮转队尾
    ///
    /// 写文件失败时员工仍留在内存名册中，因此同样进入轮转，再返回错误。
    pub fn register(&mut self, member: NewStaffMember) -> Result<RecordId> {
        let id = self.store.next_id();
        let saved = self.store.append(member);
        self.rotation.enqueue(id);
        saved?;
        tracing::info!("Registered staff member {}, rotation size {}", id, self.rotation.len());
        Ok(id)
    }

    pub fn get(&self, id: RecordId) -> Result<&StaffMember> {
        self.store.get(id)
    }

    pub fn update(&mut self, id: RecordId, update: StaffUpdate) -> Result<&StaffMember> {
        let member = self.store.update(id, |s| update.apply(s))?;
        tracing::info!("Updated staff member {}", id);
        Ok(member)
    }

    /// 移除员工，同时从轮转中清除
    pub fn remove(&mut self, id: RecordId) -> Result<StaffMember> {
        let removed = self.store.remove(id);
        // 写文件失败时记录已经离开内存名册，轮转也要同步
        let purged = self.rotation.purge(&id);
        let member = removed?;
        tracing::info!("Removed staff member {} ({} rotation slots purged)", id, purged);
        Ok(member)
    }

    /// 分配下一位值班员工
    pub fn assign_next_duty(&mut self) -> Result<&StaffMember> {
        let id = self.rotation.assign_next()?;
        let member = self
            .store
            .find(id)
            .ok_or_else(|| ClinicError::Internal(format!("staff {} in rotation but not on roster", id)))?;

        tracing::info!("Assigned duty to staff member {} ({})", member.id, member.department);
        Ok(member)
    }

    /// 当前值班顺序
    pub fn duty_roster(&self) -> Vec<&StaffMember> {
        self.rotation
            .snapshot()
            .into_iter()
            .filter_map(|id| self.store.find(id))
            .collect()
    }

    pub fn list(&self) -> Vec<StaffMember> {
        self.store.records()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
