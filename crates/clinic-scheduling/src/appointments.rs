//! 预约调度
//!
//! 常规预约先到先得，急诊预约按严重程度优先，急诊永远先于常规。

use crate::book::{ScheduleBook, ScheduleCodec};
use crate::priority::{QueueSummary, Scheduled};
use clinic_core::csv::{parse_int_lossy, parse_u32_lossy};
use clinic_core::{
    Appointment, AppointmentKind, EmergencyAppointment, RecordId, Result, Severity,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 预约文件的行格式
#[derive(Debug)]
pub struct AppointmentCodec;

impl ScheduleCodec for AppointmentCodec {
    type Item = Appointment;

    const KIND: &'static str = "appointment";
    const HEADER: &'static str = "PatientID,DoctorID,Date,Time,Type,Severity";

    fn encode(item: &Appointment, priority: Option<Severity>) -> Vec<String> {
        let (kind, severity) = match priority {
            Some(severity) => (AppointmentKind::Emergency, severity.value().to_string()),
            None => (AppointmentKind::Regular, "0".to_string()),
        };
        vec![
            item.patient_id.to_string(),
            item.doctor_id.to_string(),
            item.date.clone(),
            item.time.clone(),
            kind.as_str().to_string(),
            severity,
        ]
    }

    fn decode(fields: &[String]) -> (Appointment, Option<Severity>) {
        let get = |i: usize| fields.get(i).map(String::as_str).unwrap_or_default();
        let kind = AppointmentKind::from_label(get(4));
        let appointment = Appointment {
            patient_id: parse_u32_lossy(get(0)),
            doctor_id: parse_u32_lossy(get(1)),
            date: get(2).to_string(),
            time: get(3).to_string(),
            kind,
        };
        let severity = match kind {
            AppointmentKind::Emergency => Some(Severity::clamped(parse_int_lossy(get(5)))),
            AppointmentKind::Regular => None,
        };
        (appointment, severity)
    }
}

/// 下一个要处理的预约
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NextAppointment {
    Emergency(EmergencyAppointment),
    Regular(Appointment),
}

impl NextAppointment {
    pub fn appointment(&self) -> &Appointment {
        match self {
            NextAppointment::Emergency(emergency) => &emergency.appointment,
            NextAppointment::Regular(appointment) => appointment,
        }
    }

    pub fn severity(&self) -> Option<Severity> {
        match self {
            NextAppointment::Emergency(emergency) => Some(emergency.severity),
            NextAppointment::Regular(_) => None,
        }
    }
}

impl From<Scheduled<Appointment>> for NextAppointment {
    fn from(scheduled: Scheduled<Appointment>) -> Self {
        match scheduled {
            Scheduled::Urgent { item, priority } => NextAppointment::Emergency(EmergencyAppointment {
                appointment: item,
                severity: priority,
            }),
            Scheduled::Routine(item) => NextAppointment::Regular(item),
        }
    }
}

/// 预约簿
#[derive(Debug)]
pub struct AppointmentBook {
    book: ScheduleBook<AppointmentCodec>,
}

impl AppointmentBook {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            book: ScheduleBook::open(path),
        }
    }

    /// 预约常规门诊
    pub fn schedule_regular(
        &mut self,
        patient_id: RecordId,
        doctor_id: RecordId,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Result<Appointment> {
        let appointment = Appointment::regular(patient_id, doctor_id, date, time);
        self.book.schedule_routine(appointment.clone())?;
        tracing::info!(
            "Scheduled regular appointment: patient {} with doctor {}",
            patient_id,
            doctor_id
        );
        Ok(appointment)
    }

    /// 预约急诊，严重程度夹取到 [1,10]
    pub fn schedule_emergency(
        &mut self,
        patient_id: RecordId,
        doctor_id: RecordId,
        date: impl Into<String>,
        time: impl Into<String>,
        severity: i64,
    ) -> Result<EmergencyAppointment> {
        let appointment = Appointment {
            kind: AppointmentKind::Emergency,
            ..Appointment::regular(patient_id, doctor_id, date, time)
        };
        let severity = self.book.schedule_urgent(appointment.clone(), severity)?;
        tracing::info!(
            "Scheduled emergency appointment: patient {} with doctor {}, severity {}",
            patient_id,
            doctor_id,
            severity
        );
        Ok(EmergencyAppointment {
            appointment,
            severity,
        })
    }

    /// 处理下一个预约
    pub fn process_next(&mut self) -> Result<NextAppointment> {
        let next = NextAppointment::from(self.book.next()?);
        tracing::info!(
            "Processing {} appointment for patient {}",
            next.appointment().kind,
            next.appointment().patient_id
        );
        Ok(next)
    }

    pub fn summary(&self) -> QueueSummary {
        self.book.summary()
    }

    /// 按处理顺序列出全部待处理预约，不修改队列
    pub fn pending(&self) -> Vec<NextAppointment> {
        let emergencies = self.book.urgent_snapshot().into_iter().map(|(severity, a)| {
            NextAppointment::Emergency(EmergencyAppointment {
                appointment: a.clone(),
                severity,
            })
        });
        let regulars = self
            .book
            .routine_snapshot()
            .into_iter()
            .map(|a| NextAppointment::Regular(a.clone()));
        emergencies.chain(regulars).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emergencies_before_regular() {
        let dir = tempfile::tempdir().unwrap();
        let mut book = AppointmentBook::open(dir.path().join("appointments.csv"));

        book.schedule_emergency(1, 1, "01-01-2025", "09:00", 3).unwrap();
        book.schedule_emergency(2, 1, "01-01-2025", "09:30", 9).unwrap();
        book.schedule_regular(3, 2, "02-01-2025", "10:00").unwrap();

        let first = book.process_next().unwrap();
        assert_eq!(first.severity().map(Severity::value), Some(9));
        let second = book.process_next().unwrap();
        assert_eq!(second.severity().map(Severity::value), Some(3));
        let third = book.process_next().unwrap();
        assert_eq!(third, NextAppointment::Regular(Appointment::regular(3, 2, "02-01-2025", "10:00")));
        assert!(book.process_next().unwrap_err().is_empty());
    }

    #[test]
    fn test_file_layout_emergencies_first() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.csv");
        let mut book = AppointmentBook::open(&path);

        book.schedule_regular(3, 2, "02-01-2025", "10:00").unwrap();
        book.schedule_emergency(1, 1, "01-01-2025", "09:00", 4).unwrap();
        book.schedule_emergency(2, 1, "01-01-2025", "09:30", 50).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "PatientID,DoctorID,Date,Time,Type,Severity\n\
             2,1,01-01-2025,09:30,Emergency,10\n\
             1,1,01-01-2025,09:00,Emergency,4\n\
             3,2,02-01-2025,10:00,Regular,0\n"
        );
    }

    #[test]
    fn test_reload_restores_pending_state() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.csv");
        let mut book = AppointmentBook::open(&path);
        book.schedule_regular(5, 1, "03-01-2025", "11:00").unwrap();
        book.schedule_regular(6, 1, "03-01-2025", "11:30").unwrap();
        book.schedule_emergency(7, 2, "03-01-2025", "08:00", 6).unwrap();
        book.process_next().unwrap();

        let reloaded = AppointmentBook::open(&path);
        assert_eq!(reloaded.summary(), QueueSummary { urgent: 0, routine: 2 });
        assert_eq!(reloaded.pending(), book.pending());
    }

    #[test]
    fn test_equal_severity_order_survives_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.csv");
        let mut book = AppointmentBook::open(&path);
        for patient in [11, 12, 13] {
            book.schedule_emergency(patient, 1, "04-01-2025", "08:00", 5).unwrap();
        }
        book.schedule_emergency(14, 1, "04-01-2025", "08:05", 2).unwrap();
        book.schedule_emergency(15, 1, "04-01-2025", "08:10", 5).unwrap();

        let mut reloaded = AppointmentBook::open(&path);
        let order: Vec<_> = std::iter::from_fn(|| reloaded.process_next().ok())
            .map(|next| next.appointment().patient_id)
            .collect();
        assert_eq!(order, vec![11, 12, 13, 15, 14]);
    }

    #[test]
    fn test_malformed_rows_decode_leniently() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("appointments.csv");
        std::fs::write(
            &path,
            "PatientID,DoctorID,Date,Time,Type,Severity\n\
             x,2,01-01-2025,09:00,Emergency,-4\n\
             1,1,01-01-2025,09:00,Walk-in,7\n",
        )
        .unwrap();

        let mut book = AppointmentBook::open(&path);
        assert_eq!(book.summary(), QueueSummary { urgent: 1, routine: 1 });

        let first = book.process_next().unwrap();
        assert_eq!(first.appointment().patient_id, 0);
        assert_eq!(first.severity().map(Severity::value), Some(1));
        assert_eq!(book.process_next().unwrap().severity(), None);
    }
}
