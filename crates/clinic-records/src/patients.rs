//! 患者管理

use crate::store::{field, Record, RecordStore};
use clinic_core::csv::parse_u32_lossy;
use clinic_core::{NewPatient, Patient, PatientUpdate, RecordId, Result};
use std::path::PathBuf;

impl Record for Patient {
    type Draft = NewPatient;

    const KIND: &'static str = "Patient";
    const HEADER: &'static str = "ID,Name,Age,Gender,Contact,MedicalHistory,Symptoms";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn from_draft(id: RecordId, draft: NewPatient) -> Self {
        Patient {
            id,
            name: draft.name,
            age: draft.age,
            gender: draft.gender,
            contact: draft.contact,
            medical_history: draft.medical_history,
            symptoms: draft.symptoms,
        }
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.age.to_string(),
            self.gender.clone(),
            self.contact.clone(),
            self.medical_history.clone(),
            self.symptoms.clone(),
        ]
    }

    fn from_fields(fields: &[String]) -> Self {
        Patient {
            id: parse_u32_lossy(&field(fields, 0)),
            name: field(fields, 1),
            age: parse_u32_lossy(&field(fields, 2)),
            gender: field(fields, 3),
            contact: field(fields, 4),
            medical_history: field(fields, 5),
            symptoms: field(fields, 6),
        }
    }
}

/// 患者登记簿
#[derive(Debug)]
pub struct PatientRegistry {
    store: RecordStore<Patient>,
}

impl PatientRegistry {
    /// 打开患者登记簿并加载文件
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            store: RecordStore::open(path),
        }
    }

    /// 登记新患者
    pub fn register(&mut self, patient: NewPatient) -> Result<RecordId> {
        let id = self.store.append(patient)?;
        tracing::info!("Registered patient {}", id);
        Ok(id)
    }

    pub fn get(&self, id: RecordId) -> Result<&Patient> {
        self.store.get(id)
    }

    /// 更新患者信息
    pub fn update(&mut self, id: RecordId, update: PatientUpdate) -> Result<&Patient> {
        let patient = self.store.update(id, |p| update.apply(p))?;
        tracing::info!("Updated patient {}", id);
        Ok(patient)
    }

    /// 移除患者
    ///
    /// 引用该患者的预约和急诊病例不受影响。
    pub fn remove(&mut self, id: RecordId) -> Result<Patient> {
        let patient = self.store.remove(id)?;
        tracing::info!("Removed patient {}", id);
        Ok(patient)
    }

    /// 当前症状文本，供外部症状检查器读取
    pub fn symptoms_of(&self, id: RecordId) -> Result<&str> {
        Ok(self.store.get(id)?.symptoms.as_str())
    }

    pub fn list(&self) -> Vec<Patient> {
        self.store.records()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_patient(name: &str, symptoms: &str) -> NewPatient {
        NewPatient {
            name: name.to_string(),
            age: 25,
            gender: "M".to_string(),
            contact: "0300-1234567".to_string(),
            medical_history: "none".to_string(),
            symptoms: symptoms.to_string(),
        }
    }

    #[test]
    fn test_register_and_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let mut registry = PatientRegistry::open(dir.path().join("patients.csv"));

        let id = registry.register(new_patient("Ali", "chills, fatigue")).unwrap();
        assert_eq!(id, 1);
        assert_eq!(registry.get(id).unwrap().name, "Ali");
        assert_eq!(registry.symptoms_of(id).unwrap(), "chills, fatigue");
        assert!(registry.symptoms_of(2).unwrap_err().is_not_found());
    }

    #[test]
    fn test_update_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.csv");
        let mut registry = PatientRegistry::open(&path);
        let id = registry.register(new_patient("Ali", "cough")).unwrap();

        let update = PatientUpdate {
            name: Some("Ali Khan".to_string()),
            age: Some(26),
            ..Default::default()
        };
        registry.update(id, update).unwrap();

        let reloaded = PatientRegistry::open(&path);
        let patient = reloaded.get(id).unwrap();
        assert_eq!(patient.name, "Ali Khan");
        assert_eq!(patient.age, 26);
        assert_eq!(patient.symptoms, "cough");
    }

    #[test]
    fn test_file_layout() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patients.csv");
        let mut registry = PatientRegistry::open(&path);
        registry.register(new_patient("Sara", "fever, nausea")).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "ID,Name,Age,Gender,Contact,MedicalHistory,Symptoms\n\
             1,Sara,25,M,0300-1234567,none,\"fever, nausea\"\n"
        );
    }
}
