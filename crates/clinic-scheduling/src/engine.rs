//! 诊所引擎
//!
//! 协调记录管理、预约调度和急诊接诊的统一入口。每个存储或调度器各自持有一把独占锁，
//! 锁在整个“读取-修改-重写文件”期间保持。

use crate::appointments::{AppointmentBook, NextAppointment};
use crate::emergency::EmergencyIntake;
use crate::priority::QueueSummary;
use clinic_core::{
    Appointment, Doctor, DoctorUpdate, EmergencyAppointment, EmergencyCase, NewDoctor, NewPatient,
    NewStaffMember, Patient, PatientUpdate, RecordId, Result, StaffMember, StaffUpdate,
};
use clinic_records::{DoctorRegistry, PatientRegistry, StaffRoster, SymptomCatalog};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;

/// 各数据文件的位置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnginePaths {
    pub patients: PathBuf,
    pub doctors: PathBuf,
    pub staff: PathBuf,
    pub appointments: PathBuf,
    pub emergency_cases: PathBuf,
    pub symptoms: PathBuf,
}

impl EnginePaths {
    /// 使用默认文件名，全部放在同一目录下
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            patients: dir.join("patients.csv"),
            doctors: dir.join("doctors.csv"),
            staff: dir.join("staff.csv"),
            appointments: dir.join("appointments.csv"),
            emergency_cases: dir.join("emergency_cases.csv"),
            symptoms: dir.join("symptoms.txt"),
        }
    }
}

/// 系统概览
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClinicOverview {
    pub patients: usize,
    pub doctors: usize,
    pub staff: usize,
    pub appointments: QueueSummary,
    pub emergency_cases: usize,
    pub known_symptoms: usize,
}

/// 诊所引擎
#[derive(Debug)]
pub struct ClinicEngine {
    patients: Mutex<PatientRegistry>,
    doctors: Mutex<DoctorRegistry>,
    staff: Mutex<StaffRoster>,
    appointments: Mutex<AppointmentBook>,
    emergencies: Mutex<EmergencyIntake>,
    symptoms: SymptomCatalog,
}

impl ClinicEngine {
    /// 打开全部数据文件，在接受任何命令之前完成加载
    pub fn open(paths: &EnginePaths) -> Self {
        tracing::info!("Opening clinic data files");
        let engine = Self {
            patients: Mutex::new(PatientRegistry::open(&paths.patients)),
            doctors: Mutex::new(DoctorRegistry::open(&paths.doctors)),
            staff: Mutex::new(StaffRoster::open(&paths.staff)),
            appointments: Mutex::new(AppointmentBook::open(&paths.appointments)),
            emergencies: Mutex::new(EmergencyIntake::open(&paths.emergency_cases)),
            symptoms: SymptomCatalog::load(&paths.symptoms),
        };
        tracing::debug!("Clinic engine ready");
        engine
    }

    // ---------- 患者 ----------

    pub async fn register_patient(&self, patient: NewPatient) -> Result<RecordId> {
        self.patients.lock().await.register(patient)
    }

    pub async fn patient(&self, id: RecordId) -> Result<Patient> {
        self.patients.lock().await.get(id).cloned()
    }

    pub async fn update_patient(&self, id: RecordId, update: PatientUpdate) -> Result<Patient> {
        self.patients.lock().await.update(id, update).cloned()
    }

    pub async fn remove_patient(&self, id: RecordId) -> Result<Patient> {
        self.patients.lock().await.remove(id)
    }

    pub async fn patients(&self) -> Vec<Patient> {
        self.patients.lock().await.list()
    }

    /// 患者当前症状文本，供外部症状检查器使用
    pub async fn patient_symptoms(&self, id: RecordId) -> Result<String> {
        self.patients.lock().await.symptoms_of(id).map(str::to_string)
    }

    /// 已知症状名称（有序）
    pub fn symptom_names(&self) -> &[String] {
        self.symptoms.names()
    }

    // ---------- 医生 ----------

    pub async fn register_doctor(&self, doctor: NewDoctor) -> Result<RecordId> {
        self.doctors.lock().await.register(doctor)
    }

    pub async fn doctor(&self, id: RecordId) -> Result<Doctor> {
        self.doctors.lock().await.get(id).cloned()
    }

    pub async fn update_doctor(&self, id: RecordId, update: DoctorUpdate) -> Result<Doctor> {
        self.doctors.lock().await.update(id, update).cloned()
    }

    pub async fn remove_doctor(&self, id: RecordId) -> Result<Doctor> {
        self.doctors.lock().await.remove(id)
    }

    pub async fn doctors(&self) -> Vec<Doctor> {
        self.doctors.lock().await.list()
    }

    pub async fn doctors_by_specialization(&self, specialization: &str) -> Vec<Doctor> {
        self.doctors
            .lock()
            .await
            .by_specialization(specialization)
            .into_iter()
            .cloned()
            .collect()
    }

    // ---------- 员工 ----------

    pub async fn register_staff(&self, member: NewStaffMember) -> Result<RecordId> {
        self.staff.lock().await.register(member)
    }

    pub async fn staff_member(&self, id: RecordId) -> Result<StaffMember> {
        self.staff.lock().await.get(id).cloned()
    }

    pub async fn update_staff(&self, id: RecordId, update: StaffUpdate) -> Result<StaffMember> {
        self.staff.lock().await.update(id, update).cloned()
    }

    pub async fn remove_staff(&self, id: RecordId) -> Result<StaffMember> {
        self.staff.lock().await.remove(id)
    }

    pub async fn staff(&self) -> Vec<StaffMember> {
        self.staff.lock().await.list()
    }

    pub async fn assign_next_duty(&self) -> Result<StaffMember> {
        self.staff.lock().await.assign_next_duty().cloned()
    }

    pub async fn duty_roster(&self) -> Vec<StaffMember> {
        self.staff
            .lock()
            .await
            .duty_roster()
            .into_iter()
            .cloned()
            .collect()
    }

    // ---------- 预约 ----------

    pub async fn schedule_regular_appointment(
        &self,
        patient_id: RecordId,
        doctor_id: RecordId,
        date: String,
        time: String,
    ) -> Result<Appointment> {
        self.appointments
            .lock()
            .await
            .schedule_regular(patient_id, doctor_id, date, time)
    }

    pub async fn schedule_emergency_appointment(
        &self,
        patient_id: RecordId,
        doctor_id: RecordId,
        date: String,
        time: String,
        severity: i64,
    ) -> Result<EmergencyAppointment> {
        self.appointments
            .lock()
            .await
            .schedule_emergency(patient_id, doctor_id, date, time, severity)
    }

    pub async fn process_next_appointment(&self) -> Result<NextAppointment> {
        self.appointments.lock().await.process_next()
    }

    pub async fn appointment_summary(&self) -> QueueSummary {
        self.appointments.lock().await.summary()
    }

    pub async fn pending_appointments(&self) -> Vec<NextAppointment> {
        self.appointments.lock().await.pending()
    }

    // ---------- 急诊 ----------

    pub async fn register_emergency_case(
        &self,
        patient_id: RecordId,
        symptoms: String,
        criticality: i64,
        arrival_time: Option<String>,
    ) -> Result<EmergencyCase> {
        self.emergencies
            .lock()
            .await
            .register(patient_id, symptoms, criticality, arrival_time)
    }

    pub async fn attend_next_emergency(&self) -> Result<EmergencyCase> {
        self.emergencies.lock().await.attend_next()
    }

    pub async fn pending_emergency_cases(&self) -> Vec<EmergencyCase> {
        self.emergencies.lock().await.pending()
    }

    /// 获取系统概览
    pub async fn overview(&self) -> ClinicOverview {
        ClinicOverview {
            patients: self.patients.lock().await.len(),
            doctors: self.doctors.lock().await.len(),
            staff: self.staff.lock().await.len(),
            appointments: self.appointments.lock().await.summary(),
            emergency_cases: self.emergencies.lock().await.pending_count(),
            known_symptoms: self.symptoms.len(),
        }
    }
}
