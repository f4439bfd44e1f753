//! 核心数据模型定义

use serde::{Deserialize, Serialize};
use std::fmt;

/// 记录标识符，由存储分配，同类记录内唯一且递增
pub type RecordId = u32;

/// 严重程度 / 危急程度，取值范围 [1,10]
///
/// 超出范围的值总是被拉回最近的边界，从不拒绝。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "i64", into = "u8")]
pub struct Severity(u8);

impl Severity {
    pub const MIN: u8 = 1;
    pub const MAX: u8 = 10;

    /// 夹取到 [1,10]
    pub fn clamped(raw: i64) -> Self {
        Severity(raw.clamp(i64::from(Self::MIN), i64::from(Self::MAX)) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl From<i64> for Severity {
    fn from(raw: i64) -> Self {
        Severity::clamped(raw)
    }
}

impl From<Severity> for u8 {
    fn from(severity: Severity) -> Self {
        severity.0
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.0, Self::MAX)
    }
}

/// 患者信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patient {
    pub id: RecordId,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub contact: String,
    pub medical_history: String,
    pub symptoms: String, // 当前症状，供症状检查器使用
}

/// 新患者登记信息（ID由存储分配）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub contact: String,
    pub medical_history: String,
    pub symptoms: String,
}

/// 患者信息更新，只修改给出的字段
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatientUpdate {
    pub name: Option<String>,
    pub age: Option<u32>,
    pub contact: Option<String>,
    pub medical_history: Option<String>,
    pub symptoms: Option<String>,
}

impl PatientUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.age.is_none()
            && self.contact.is_none()
            && self.medical_history.is_none()
            && self.symptoms.is_none()
    }

    pub fn apply(self, patient: &mut Patient) {
        if let Some(name) = self.name {
            patient.name = name;
        }
        if let Some(age) = self.age {
            patient.age = age;
        }
        if let Some(contact) = self.contact {
            patient.contact = contact;
        }
        if let Some(history) = self.medical_history {
            patient.medical_history = history;
        }
        if let Some(symptoms) = self.symptoms {
            patient.symptoms = symptoms;
        }
    }
}

/// 医生信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Doctor {
    pub id: RecordId,
    pub name: String,
    pub specialization: String,
    pub experience_years: u32,
    pub contact: String,
    pub availability: String, // 可预约时间段，自由文本
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewDoctor {
    pub name: String,
    pub specialization: String,
    pub experience_years: u32,
    pub contact: String,
    pub availability: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DoctorUpdate {
    pub name: Option<String>,
    pub specialization: Option<String>,
    pub experience_years: Option<u32>,
    pub contact: Option<String>,
    pub availability: Option<String>,
}

impl DoctorUpdate {
    pub fn apply(self, doctor: &mut Doctor) {
        if let Some(name) = self.name {
            doctor.name = name;
        }
        if let Some(specialization) = self.specialization {
            doctor.specialization = specialization;
        }
        if let Some(years) = self.experience_years {
            doctor.experience_years = years;
        }
        if let Some(contact) = self.contact {
            doctor.contact = contact;
        }
        if let Some(availability) = self.availability {
            doctor.availability = availability;
        }
    }
}

/// 员工信息
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    pub id: RecordId,
    pub name: String,
    pub shift: String, // Morning / Evening / Night
    pub department: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewStaffMember {
    pub name: String,
    pub shift: String,
    pub department: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaffUpdate {
    pub name: Option<String>,
    pub shift: Option<String>,
    pub department: Option<String>,
}

impl StaffUpdate {
    pub fn apply(self, member: &mut StaffMember) {
        if let Some(name) = self.name {
            member.name = name;
        }
        if let Some(shift) = self.shift {
            member.shift = shift;
        }
        if let Some(department) = self.department {
            member.department = department;
        }
    }
}

/// 预约类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AppointmentKind {
    Regular,   // 常规
    Emergency, // 急诊
}

impl AppointmentKind {
    pub fn as_str(self) -> &'static str {
        match self {
            AppointmentKind::Regular => "Regular",
            AppointmentKind::Emergency => "Emergency",
        }
    }

    /// 只有字面量 `Emergency` 被识别为急诊，其余一律按常规处理
    pub fn from_label(label: &str) -> Self {
        if label.trim() == "Emergency" {
            AppointmentKind::Emergency
        } else {
            AppointmentKind::Regular
        }
    }
}

impl fmt::Display for AppointmentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 预约
///
/// 患者和医生ID不做引用完整性检查。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Appointment {
    pub patient_id: RecordId,
    pub doctor_id: RecordId,
    pub date: String, // DD-MM-YYYY
    pub time: String, // HH:MM
    pub kind: AppointmentKind,
}

impl Appointment {
    pub fn regular(
        patient_id: RecordId,
        doctor_id: RecordId,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            patient_id,
            doctor_id,
            date: date.into(),
            time: time.into(),
            kind: AppointmentKind::Regular,
        }
    }
}

/// 急诊预约
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyAppointment {
    pub appointment: Appointment,
    pub severity: Severity,
}

/// 急诊病例，独立于预约
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmergencyCase {
    pub patient_id: RecordId,
    pub symptoms: String,
    pub criticality: Severity,
    pub arrival_time: String, // HH:MM
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_clamping() {
        assert_eq!(Severity::clamped(-5).value(), 1);
        assert_eq!(Severity::clamped(0).value(), 1);
        assert_eq!(Severity::clamped(7).value(), 7);
        assert_eq!(Severity::clamped(50).value(), 10);
        assert!(Severity::clamped(9) > Severity::clamped(3));
        assert_eq!(Severity::clamped(4).to_string(), "4/10");
    }

    #[test]
    fn test_appointment_kind_label() {
        assert_eq!(AppointmentKind::from_label("Emergency"), AppointmentKind::Emergency);
        assert_eq!(AppointmentKind::from_label("Regular"), AppointmentKind::Regular);
        assert_eq!(AppointmentKind::from_label("garbage"), AppointmentKind::Regular);
    }

    #[test]
    fn test_patient_update_only_touches_given_fields() {
        let mut patient = Patient {
            id: 1,
            name: "Ann".to_string(),
            age: 30,
            gender: "F".to_string(),
            contact: "555".to_string(),
            medical_history: "asthma".to_string(),
            symptoms: "cough".to_string(),
        };

        PatientUpdate {
            age: Some(31),
            contact: Some("777".to_string()),
            ..Default::default()
        }
        .apply(&mut patient);

        assert_eq!(patient.name, "Ann");
        assert_eq!(patient.age, 31);
        assert_eq!(patient.contact, "777");
        assert_eq!(patient.medical_history, "asthma");
    }
}
