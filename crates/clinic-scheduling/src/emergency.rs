//! 急诊病例接诊
//!
//! 每个病例都是紧急的，只按危急程度排序，没有常规队列。

use crate::book::{ScheduleBook, ScheduleCodec};
use clinic_core::csv::{parse_int_lossy, parse_u32_lossy};
use clinic_core::{ClinicError, EmergencyCase, RecordId, Result, Severity};
use std::path::PathBuf;

/// 急诊病例文件的行格式
#[derive(Debug)]
pub struct EmergencyCaseCodec;

impl ScheduleCodec for EmergencyCaseCodec {
    type Item = EmergencyCase;

    const KIND: &'static str = "emergency case";
    const HEADER: &'static str = "PatientID,Symptoms,Criticality,ArrivalTime";

    fn encode(case: &EmergencyCase, priority: Option<Severity>) -> Vec<String> {
        let criticality = priority.unwrap_or(case.criticality);
        vec![
            case.patient_id.to_string(),
            case.symptoms.clone(),
            criticality.value().to_string(),
            case.arrival_time.clone(),
        ]
    }

    fn decode(fields: &[String]) -> (EmergencyCase, Option<Severity>) {
        let get = |i: usize| fields.get(i).map(String::as_str).unwrap_or_default();
        let case = EmergencyCase {
            patient_id: parse_u32_lossy(get(0)),
            symptoms: get(1).to_string(),
            criticality: Severity::clamped(parse_int_lossy(get(2))),
            arrival_time: get(3).to_string(),
        };
        let criticality = case.criticality;
        (case, Some(criticality))
    }
}

/// 急诊接诊台
#[derive(Debug)]
pub struct EmergencyIntake {
    book: ScheduleBook<EmergencyCaseCodec>,
}

impl EmergencyIntake {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            book: ScheduleBook::open(path),
        }
    }

    /// 登记急诊病例
    ///
    /// 危急程度夹取到 [1,10]；未给出到达时间时取当前本地时间 `HH:MM`。
    pub fn register(
        &mut self,
        patient_id: RecordId,
        symptoms: impl Into<String>,
        criticality: i64,
        arrival_time: Option<String>,
    ) -> Result<EmergencyCase> {
        let criticality = Severity::clamped(criticality);
        let case = EmergencyCase {
            patient_id,
            symptoms: symptoms.into(),
            criticality,
            arrival_time: arrival_time
                .unwrap_or_else(|| chrono::Local::now().format("%H:%M").to_string()),
        };

        self.book
            .schedule_urgent(case.clone(), i64::from(criticality.value()))?;
        tracing::warn!(
            "Emergency case registered for patient {} with criticality {}",
            patient_id,
            criticality
        );
        Ok(case)
    }

    /// 接诊最危急的病例
    pub fn attend_next(&mut self) -> Result<EmergencyCase> {
        let case = self.book.next().map_err(|e| match e {
            ClinicError::Empty(_) => ClinicError::Empty("no emergency cases pending".to_string()),
            other => other,
        })?;
        let case = case.into_item();
        tracing::info!(
            "Attending emergency case for patient {} (criticality {})",
            case.patient_id,
            case.criticality
        );
        Ok(case)
    }

    pub fn pending_count(&self) -> usize {
        self.book.summary().urgent
    }

    /// 按危急程度降序列出待处理病例，不修改队列
    pub fn pending(&self) -> Vec<EmergencyCase> {
        self.book
            .urgent_snapshot()
            .into_iter()
            .map(|(_, case)| case.clone())
            .collect()
    }
}
