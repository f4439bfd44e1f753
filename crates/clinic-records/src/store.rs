//! 通用记录存储
//!
//! 单一实体类型的有序记录集合，以平面CSV文件为后备存储。

use clinic_core::persistence::FlatFile;
use clinic_core::{ClinicError, RecordId, Result};
use indexmap::IndexMap;
use std::fmt;
use std::path::PathBuf;
use tracing::{debug, error, warn};

/// 可存入记录存储的实体
pub trait Record: Clone + fmt::Debug {
    /// 登记时由调用方提供的字段（不含ID）
    type Draft;

    /// 实体名称，用于日志和错误信息
    const KIND: &'static str;

    /// 文件表头
    const HEADER: &'static str;

    fn id(&self) -> RecordId;

    /// 加载时为冲突或非法ID的行重新分配ID
    fn set_id(&mut self, id: RecordId);

    fn from_draft(id: RecordId, draft: Self::Draft) -> Self;

    /// 按声明顺序输出字段（未编码）
    fn to_fields(&self) -> Vec<String>;

    /// 从已解码的字段还原记录，缺失字段取空值，整数字段尽力解析
    fn from_fields(fields: &[String]) -> Self;
}

/// 取第 `index` 个字段，缺失时为空串
pub(crate) fn field(fields: &[String], index: usize) -> String {
    fields.get(index).cloned().unwrap_or_default()
}

/// 记录存储
///
/// 内存中的顺序等于插入顺序，删除不会重排其余记录，ID不会在同一实例内复用。
#[derive(Debug)]
pub struct RecordStore<R: Record> {
    file: FlatFile,
    records: IndexMap<RecordId, R>,
    next_id: RecordId,
}

impl<R: Record> RecordStore<R> {
    /// 打开存储并加载后备文件
    ///
    /// 文件缺失或不可读时从空集合开始，下一个ID为1。
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let mut store = Self {
            file: FlatFile::new(path, R::HEADER),
            records: IndexMap::new(),
            next_id: 1,
        };
        store.load();
        store
    }

    fn load(&mut self) {
        let rows: Vec<R> = self
            .file
            .load_rows()
            .iter()
            .map(|fields| R::from_fields(fields))
            .collect();
        self.next_id = rows
            .iter()
            .map(R::id)
            .max()
            .map_or(1, |max| max.saturating_add(1));

        // 每个非空行都保留；ID为0或与前面的行重复时分配新ID
        for (line, mut record) in rows.into_iter().enumerate() {
            let id = record.id();
            if id == 0 || self.records.contains_key(&id) {
                let fresh = self.next_id;
                self.next_id = self.next_id.saturating_add(1);
                warn!(
                    "{} row {} has unusable id {:?}, reassigned to {}",
                    R::KIND,
                    line + 1,
                    id,
                    fresh
                );
                record.set_id(fresh);
            }
            self.records.insert(record.id(), record);
        }

        debug!(
            "Loaded {} {} records, next id {}",
            self.records.len(),
            R::KIND,
            self.next_id
        );
    }

    /// 整文件重写
    pub fn save(&self) -> Result<()> {
        self.file
            .rewrite(self.records.values().map(R::to_fields))
            .map_err(|e| {
                error!("Failed to persist {} records: {}", R::KIND, e);
                e
            })
    }

    /// 追加新记录，返回分配的ID
    ///
    /// 返回前文件已经重写完毕。写入失败时内存中的记录保留，错误返回给调用方。
    pub fn append(&mut self, draft: R::Draft) -> Result<RecordId> {
        let id = self.next_id;
        self.next_id = self.next_id.saturating_add(1);

        self.records.insert(id, R::from_draft(id, draft));
        self.save()?;
        Ok(id)
    }

    /// 按ID查找
    pub fn find(&self, id: RecordId) -> Option<&R> {
        self.records.get(&id)
    }

    /// 按ID查找，不存在时返回 NotFound
    pub fn get(&self, id: RecordId) -> Result<&R> {
        self.find(id).ok_or_else(|| Self::not_found(id))
    }

    /// 原地修改记录并持久化
    ///
    /// 修改函数不得改变记录的ID。
    pub fn update<F>(&mut self, id: RecordId, apply: F) -> Result<&R>
    where
        F: FnOnce(&mut R),
    {
        let record = self.records.get_mut(&id).ok_or_else(|| Self::not_found(id))?;
        apply(record);
        debug_assert_eq!(record.id(), id, "update must not change the record id");

        self.save()?;
        self.get(id)
    }

    /// 从集合中移除记录并持久化，其余记录保持原有顺序
    pub fn remove(&mut self, id: RecordId) -> Result<R> {
        let removed = self
            .records
            .shift_remove(&id)
            .ok_or_else(|| Self::not_found(id))?;

        self.save()?;
        Ok(removed)
    }

    /// 按当前顺序遍历
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.records.values()
    }

    /// 当前全部记录的有序副本
    pub fn records(&self) -> Vec<R> {
        self.records.values().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 下一次追加将分配的ID
    pub fn next_id(&self) -> RecordId {
        self.next_id
    }

    fn not_found(id: RecordId) -> ClinicError {
        ClinicError::NotFound(format!("{} {} not found", R::KIND, id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinic_core::{NewPatient, Patient};

    fn draft(name: &str) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            age: 40,
            gender: "F".to_string(),
            contact: "555-0100".to_string(),
            medical_history: "none".to_string(),
            symptoms: "headache, fever".to_string(),
        }
    }

    #[test]
    fn test_ids_are_never_reused() {
        let dir = tempfile::tempdir().unwrap();
        let mut store: RecordStore<Patient> = RecordStore::open(dir.path().join("patients.csv"));

        let a = store.append(draft("A")).unwrap();
        let b = store.append(draft("B")).unwrap();
        let c = store.append(draft("C")).unwrap();
        assert_eq!((a, b, c), (1, 2, 3));

        store.remove(2).unwrap();
        let ids: Vec<_> = store.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1, 3]);

        assert_eq!(store.append(draft("D")).unwrap(), 4);
    }

    #[test]
    fn test_round_trip_preserves_order_and_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.csv");

        let mut store: RecordStore<Patient> = RecordStore::open(&path);
        store.append(draft("Zed")).unwrap();
        store.append(draft("Amy \"the nurse\"")).unwrap();
        store.append(draft("Bo")).unwrap();
        store.update(1, |p| p.symptoms = "rash\nitching".to_string()).unwrap();
        store.remove(2).unwrap();

        let reloaded: RecordStore<Patient> = RecordStore::open(&path);
        assert_eq!(reloaded.records(), store.records());
        assert_eq!(reloaded.next_id(), 4);
    }

    #[test]
    fn test_missing_targets_report_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let mut store: RecordStore<Patient> = RecordStore::open(dir.path().join("patients.csv"));
        store.append(draft("A")).unwrap();

        assert!(store.get(9).unwrap_err().is_not_found());
        assert!(store.update(9, |p| p.age = 1).unwrap_err().is_not_found());
        assert!(store.remove(9).unwrap_err().is_not_found());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_removing_head_keeps_remaining_order() {
        let dir = tempfile::tempdir().unwrap();
        let mut store: RecordStore<Patient> = RecordStore::open(dir.path().join("patients.csv"));
        for name in ["A", "B", "C"] {
            store.append(draft(name)).unwrap();
        }

        let removed = store.remove(1).unwrap();
        assert_eq!(removed.name, "A");
        let names: Vec<_> = store.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_load_tolerates_malformed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.csv");
        std::fs::write(
            &path,
            "ID,Name,Age,Gender,Contact,MedicalHistory,Symptoms\r\n\
             7,Ann,abc,F,1,,\r\n\
             \r\n\
             x,Ghost\r\n\
             3,Bob,51,M,2,diabetes,\"cough, fever\"\r\n",
        )
        .unwrap();

        let store: RecordStore<Patient> = RecordStore::open(&path);
        let ids: Vec<_> = store.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![7, 8, 3]);
        assert_eq!(store.get(7).unwrap().age, 0);
        assert_eq!(store.get(8).unwrap().name, "Ghost");
        assert_eq!(store.get(8).unwrap().contact, "");
        assert_eq!(store.get(3).unwrap().symptoms, "cough, fever");
        assert_eq!(store.next_id(), 9);
    }

    #[test]
    fn test_colliding_ids_keep_every_row() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.csv");
        std::fs::write(
            &path,
            "ID,Name,Age,Gender,Contact,MedicalHistory,Symptoms\n\
             x,Ann,30,F,1,,\n\
             y,Bob,31,M,2,,\n\
             5,Cas,32,F,3,,\n\
             5,Dee,33,M,4,,\n",
        )
        .unwrap();

        let mut store: RecordStore<Patient> = RecordStore::open(&path);
        let names: Vec<_> = store.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Ann", "Bob", "Cas", "Dee"]);
        assert_eq!(store.get(5).unwrap().name, "Cas");

        let id = store.append(draft("Cy")).unwrap();
        assert_eq!(id, 9);

        let reloaded: RecordStore<Patient> = RecordStore::open(&path);
        let names: Vec<_> = reloaded.iter().map(|p| p.name.clone()).collect();
        assert_eq!(names, vec!["Ann", "Bob", "Cas", "Dee", "Cy"]);
        let ids: Vec<_> = reloaded.iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![6, 7, 5, 8, 9]);
    }
}
