//! 医生管理

use crate::store::{field, Record, RecordStore};
use clinic_core::csv::parse_u32_lossy;
use clinic_core::{Doctor, DoctorUpdate, NewDoctor, RecordId, Result};
use std::path::PathBuf;

impl Record for Doctor {
    type Draft = NewDoctor;

    const KIND: &'static str = "Doctor";
    const HEADER: &'static str = "ID,Name,Specialization,Experience,Contact,Availability";

    fn id(&self) -> RecordId {
        self.id
    }

    fn set_id(&mut self, id: RecordId) {
        self.id = id;
    }

    fn from_draft(id: RecordId, draft: NewDoctor) -> Self {
        Doctor {
            id,
            name: draft.name,
            specialization: draft.specialization,
            experience_years: draft.experience_years,
            contact: draft.contact,
            availability: draft.availability,
        }
    }

    fn to_fields(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.specialization.clone(),
            self.experience_years.to_string(),
            self.contact.clone(),
            self.availability.clone(),
        ]
    }

    fn from_fields(fields: &[String]) -> Self {
        Doctor {
            id: parse_u32_lossy(&field(fields, 0)),
            name: field(fields, 1),
            specialization: field(fields, 2),
            experience_years: parse_u32_lossy(&field(fields, 3)),
            contact: field(fields, 4),
            availability: field(fields, 5),
        }
    }
}

/// 医生名册
#[derive(Debug)]
pub struct DoctorRegistry {
    store: RecordStore<Doctor>,
}

impl DoctorRegistry {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            store: RecordStore::open(path),
        }
    }

    /// 登记新医生
    pub fn register(&mut self, doctor: NewDoctor) -> Result<RecordId> {
        let specialization = doctor.specialization.clone();
        let id = self.store.append(doctor)?;
        tracing::info!("Registered doctor {} ({})", id, specialization);
        Ok(id)
    }

    pub fn get(&self, id: RecordId) -> Result<&Doctor> {
        self.store.get(id)
    }

    pub fn update(&mut self, id: RecordId, update: DoctorUpdate) -> Result<&Doctor> {
        let doctor = self.store.update(id, |d| update.apply(d))?;
        tracing::info!("Updated doctor {}", id);
        Ok(doctor)
    }

    pub fn remove(&mut self, id: RecordId) -> Result<Doctor> {
        let doctor = self.store.remove(id)?;
        tracing::info!("Removed doctor {}", id);
        Ok(doctor)
    }

    /// 按专科精确匹配（区分大小写），保持登记顺序
    pub fn by_specialization(&self, specialization: &str) -> Vec<&Doctor> {
        self.store
            .iter()
            .filter(|d| d.specialization == specialization)
            .collect()
    }

    pub fn list(&self) -> Vec<Doctor> {
        self.store.records()
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }
}
