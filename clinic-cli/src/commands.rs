//! 命令分发
//!
//! 每条命令对应一次引擎操作，输出一行结果或原因。

use crate::cli::{
    AppointmentCommand, Command, DoctorCommand, EmergencyCommand, PatientCommand, StaffCommand,
};
use anyhow::Result;
use clinic_core::{
    Doctor, DoctorUpdate, EmergencyCase, NewDoctor, NewPatient, NewStaffMember, Patient,
    PatientUpdate, StaffMember, StaffUpdate,
};
use clinic_scheduling::{ClinicEngine, NextAppointment};
use serde::Serialize;

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// 变更结果：JSON模式为记录本身，否则为一行提示
fn render<T: Serialize>(json: bool, value: &T, message: &str) -> Result<String> {
    if json {
        Ok(serde_json::to_string_pretty(value)?)
    } else {
        Ok(message.to_string())
    }
}

fn report<T: Serialize>(json: bool, value: &T, message: &str) -> Result<()> {
    println!("{}", render(json, value, message)?);
    Ok(())
}

/// 列表输出：JSON模式整体输出，否则逐行输出，空列表输出提示
fn print_list<T, F>(items: &[T], json: bool, empty: &str, line: F) -> Result<()>
where
    T: Serialize,
    F: Fn(usize, &T) -> String,
{
    if json {
        return print_json(items);
    }
    if items.is_empty() {
        println!("{}", empty);
    }
    for (index, item) in items.iter().enumerate() {
        println!("{}", line(index, item));
    }
    Ok(())
}

fn patient_line(p: &Patient) -> String {
    format!(
        "ID: {} | Name: {} | Age: {} | Gender: {} | Contact: {}",
        p.id, p.name, p.age, p.gender, p.contact
    )
}

fn doctor_line(d: &Doctor) -> String {
    format!(
        "ID: {} | Name: {} | Specialization: {} | Experience: {} years | Availability: {}",
        d.id, d.name, d.specialization, d.experience_years, d.availability
    )
}

fn staff_line(s: &StaffMember) -> String {
    format!("{} - {} ({} Shift, ID: {})", s.name, s.department, s.shift, s.id)
}

fn appointment_line(next: &NextAppointment) -> String {
    let a = next.appointment();
    match next.severity() {
        Some(severity) => format!(
            "EMERGENCY | Patient ID: {} | Doctor ID: {} | Severity: {} | {} {}",
            a.patient_id, a.doctor_id, severity, a.date, a.time
        ),
        None => format!(
            "REGULAR | Patient ID: {} | Doctor ID: {} | {} {}",
            a.patient_id, a.doctor_id, a.date, a.time
        ),
    }
}

fn case_line(c: &EmergencyCase) -> String {
    format!(
        "Patient ID: {} | Criticality: {} | Arrival: {} | Symptoms: {}",
        c.patient_id, c.criticality, c.arrival_time, c.symptoms
    )
}

/// 执行一条命令
pub async fn dispatch(engine: &ClinicEngine, command: Command, json: bool) -> Result<()> {
    match command {
        Command::Patient { action } => patient(engine, action, json).await,
        Command::Doctor { action } => doctor(engine, action, json).await,
        Command::Staff { action } => staff(engine, action, json).await,
        Command::Appointment { action } => appointment(engine, action, json).await,
        Command::Emergency { action } => emergency(engine, action, json).await,
        Command::Overview => {
            let overview = engine.overview().await;
            if json {
                return print_json(&overview);
            }
            println!(
                "Patients: {} | Doctors: {} | Staff: {} | Appointments: {} emergency, {} regular | Emergency cases: {}",
                overview.patients,
                overview.doctors,
                overview.staff,
                overview.appointments.urgent,
                overview.appointments.routine,
                overview.emergency_cases
            );
            Ok(())
        }
        Command::Config { .. } => anyhow::bail!("config commands do not open the data files"),
    }
}

async fn patient(engine: &ClinicEngine, action: PatientCommand, json: bool) -> Result<()> {
    match action {
        PatientCommand::Add(fields) => {
            let id = engine
                .register_patient(NewPatient {
                    name: fields.name,
                    age: fields.age,
                    gender: fields.gender,
                    contact: fields.contact,
                    medical_history: fields.history,
                    symptoms: fields.symptoms,
                })
                .await?;
            report(
                json,
                &serde_json::json!({ "id": id }),
                &format!("Patient registered successfully! Assigned ID: {}", id),
            )?;
        }
        PatientCommand::Show { id } => {
            let patient = engine.patient(id).await?;
            if json {
                return print_json(&patient);
            }
            println!("{}", patient_line(&patient));
            println!("Medical history: {}", patient.medical_history);
            println!("Symptoms: {}", patient.symptoms);
        }
        PatientCommand::Update {
            id,
            name,
            age,
            contact,
            history,
            symptoms,
        } => {
            let update = PatientUpdate {
                name,
                age,
                contact,
                medical_history: history,
                symptoms,
            };
            if update.is_empty() {
                anyhow::bail!("nothing to update for patient {}", id);
            }
            let patient = engine.update_patient(id, update).await?;
            report(json, &patient, "Patient information updated successfully!")?;
        }
        PatientCommand::Remove { id } => {
            let patient = engine.remove_patient(id).await?;
            report(json, &patient, "Patient removed successfully!")?;
        }
        PatientCommand::List => {
            let patients = engine.patients().await;
            print_list(&patients, json, "No patients registered.", |_, p| patient_line(p))?;
        }
        PatientCommand::Symptoms { id } => {
            let symptoms = engine.patient_symptoms(id).await?;
            if json {
                return print_json(&serde_json::json!({
                    "patient_id": id,
                    "symptoms": symptoms,
                    "known_symptoms": engine.symptom_names(),
                }));
            }
            println!("Symptoms: {}", symptoms);
            println!("Known symptoms in catalog: {}", engine.symptom_names().len());
        }
    }
    Ok(())
}

async fn doctor(engine: &ClinicEngine, action: DoctorCommand, json: bool) -> Result<()> {
    match action {
        DoctorCommand::Add {
            name,
            specialization,
            experience,
            contact,
            availability,
        } => {
            let id = engine
                .register_doctor(NewDoctor {
                    name,
                    specialization,
                    experience_years: experience,
                    contact,
                    availability,
                })
                .await?;
            report(
                json,
                &serde_json::json!({ "id": id }),
                &format!("Doctor registered successfully! Assigned ID: {}", id),
            )?;
        }
        DoctorCommand::Show { id } => {
            let doctor = engine.doctor(id).await?;
            if json {
                return print_json(&doctor);
            }
            println!("{}", doctor_line(&doctor));
        }
        DoctorCommand::Update {
            id,
            name,
            specialization,
            experience,
            contact,
            availability,
        } => {
            let update = DoctorUpdate {
                name,
                specialization,
                experience_years: experience,
                contact,
                availability,
            };
            let doctor = engine.update_doctor(id, update).await?;
            report(json, &doctor, "Doctor information updated successfully!")?;
        }
        DoctorCommand::Remove { id } => {
            let doctor = engine.remove_doctor(id).await?;
            report(json, &doctor, "Doctor removed successfully!")?;
        }
        DoctorCommand::List => {
            let doctors = engine.doctors().await;
            print_list(&doctors, json, "No doctors registered.", |_, d| doctor_line(d))?;
        }
        DoctorCommand::Search { specialization } => {
            let doctors = engine.doctors_by_specialization(&specialization).await;
            print_list(
                &doctors,
                json,
                "No doctors found with this specialization.",
                |_, d| doctor_line(d),
            )?;
        }
    }
    Ok(())
}

async fn staff(engine: &ClinicEngine, action: StaffCommand, json: bool) -> Result<()> {
    match action {
        StaffCommand::Add {
            name,
            shift,
            department,
        } => {
            let id = engine
                .register_staff(NewStaffMember {
                    name,
                    shift,
                    department,
                })
                .await?;
            report(
                json,
                &serde_json::json!({ "id": id }),
                &format!("Staff member registered successfully! Assigned ID: {}", id),
            )?;
        }
        StaffCommand::Show { id } => {
            let member = engine.staff_member(id).await?;
            if json {
                return print_json(&member);
            }
            println!("{}", staff_line(&member));
        }
        StaffCommand::Update {
            id,
            name,
            shift,
            department,
        } => {
            let member = engine
                .update_staff(
                    id,
                    StaffUpdate {
                        name,
                        shift,
                        department,
                    },
                )
                .await?;
            report(json, &member, "Staff information updated successfully!")?;
        }
        StaffCommand::Remove { id } => {
            let member = engine.remove_staff(id).await?;
            report(json, &member, "Staff member removed successfully!")?;
        }
        StaffCommand::List => {
            let members = engine.staff().await;
            print_list(&members, json, "No staff registered.", |_, s| staff_line(s))?;
        }
        StaffCommand::Assign => {
            let member = engine.assign_next_duty().await?;
            if json {
                return print_json(&member);
            }
            println!(
                "Assigned to duty: {} (ID: {}) - Department: {}",
                member.name, member.id, member.department
            );
        }
        StaffCommand::Roster => {
            let roster = engine.duty_roster().await;
            print_list(&roster, json, "Duty roster is empty!", |i, s| {
                format!("{}. {}", i + 1, staff_line(s))
            })?;
        }
    }
    Ok(())
}

async fn appointment(engine: &ClinicEngine, action: AppointmentCommand, json: bool) -> Result<()> {
    match action {
        AppointmentCommand::Regular {
            patient,
            doctor,
            date,
            time,
        } => {
            let scheduled = engine
                .schedule_regular_appointment(patient, doctor, date, time)
                .await?;
            report(json, &scheduled, "Regular appointment scheduled successfully.")?;
        }
        AppointmentCommand::Emergency {
            patient,
            doctor,
            date,
            time,
            severity,
        } => {
            let scheduled = engine
                .schedule_emergency_appointment(patient, doctor, date, time, severity)
                .await?;
            report(
                json,
                &scheduled,
                &format!(
                    "Emergency appointment scheduled successfully (severity {}).",
                    scheduled.severity
                ),
            )?;
        }
        AppointmentCommand::Next => {
            let next = engine.process_next_appointment().await?;
            if json {
                return print_json(&next);
            }
            println!("{}", appointment_line(&next));
        }
        AppointmentCommand::Summary => {
            let summary = engine.appointment_summary().await;
            if json {
                return print_json(&summary);
            }
            println!(
                "Emergency pending: {} | Regular pending: {}",
                summary.urgent, summary.routine
            );
        }
        AppointmentCommand::List => {
            let pending = engine.pending_appointments().await;
            print_list(&pending, json, "No appointments available.", |i, a| {
                format!("{}. {}", i + 1, appointment_line(a))
            })?;
        }
    }
    Ok(())
}

async fn emergency(engine: &ClinicEngine, action: EmergencyCommand, json: bool) -> Result<()> {
    match action {
        EmergencyCommand::Register {
            patient,
            symptoms,
            criticality,
            arrival,
        } => {
            let case = engine
                .register_emergency_case(patient, symptoms, criticality, arrival)
                .await?;
            report(
                json,
                &case,
                &format!("Emergency case registered with priority {}", case.criticality),
            )?;
        }
        EmergencyCommand::Attend => {
            let case = engine.attend_next_emergency().await?;
            if json {
                return print_json(&case);
            }
            println!("MOST CRITICAL | {}", case_line(&case));
        }
        EmergencyCommand::List => {
            let cases = engine.pending_emergency_cases().await;
            print_list(&cases, json, "No emergency cases pending!", |i, c| {
                format!("{}. {}", i + 1, case_line(c))
            })?;
        }
    }
    Ok(())
}
