//! Hospital Manager Core Library
//!
//! Appointment records and the repository that stores them in a document
//! store, checking that the referenced patient and doctor exist.
//!
//! # Architecture
//!
//! ```text
//!        HTTP / app layer
//!               │
//!   ┌───────────▼────────────┐
//!   │  AppointmentRepository │──── existence checks ───┐
//!   └───────────┬────────────┘                         │
//!               │ encode / decode                      │
//!   ┌───────────▼────────────┐             ┌───────────▼──────────┐
//!   │  "appointments"        │             │  "patient", "doctor" │
//!   └───────────┬────────────┘             └───────────┬──────────┘
//!               └──────────── DocumentStore ───────────┘
//!                            (SQLite, JSON bodies)
//! ```
//!
//! # Modules
//!
//! - [`db`]: SQLite-backed document store
//! - [`models`]: Domain types (Appointment, Location, AppointmentWithId)
//! - [`repository`]: Appointment operations and document codec

pub mod db;
pub mod models;
pub mod repository;

// Re-export commonly used types
pub use db::{Database, DocumentStore};
pub use models::{Appointment, AppointmentStatus, AppointmentWithId, Location};
pub use repository::{AppointmentRepository, Collections, CreateOutcome, CreateRejection};

// UniFFI setup - using proc macros
uniffi::setup_scaffolding!();

use chrono::{DateTime, Utc};
use std::sync::{Arc, Mutex};

// =========================================================================
// FFI Error Type
// =========================================================================

#[derive(Debug, thiserror::Error, uniffi::Error)]
pub enum HospitalError {
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Decode error: {0}")]
    DecodeError(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),
}

impl From<db::DbError> for HospitalError {
    fn from(e: db::DbError) -> Self {
        HospitalError::DatabaseError(e.to_string())
    }
}

impl From<repository::RepoError> for HospitalError {
    fn from(e: repository::RepoError) -> Self {
        match e {
            repository::RepoError::Store(e) => e.into(),
            e @ repository::RepoError::Decode { .. } => HospitalError::DecodeError(e.to_string()),
            repository::RepoError::Unsupported(op) => HospitalError::Unsupported(op.to_string()),
        }
    }
}

impl<T> From<std::sync::PoisonError<T>> for HospitalError {
    fn from(e: std::sync::PoisonError<T>) -> Self {
        HospitalError::DatabaseError(format!("Lock poisoned: {}", e))
    }
}

// =========================================================================
// Factory Functions (exported to FFI)
// =========================================================================

/// Open or create a database at the given path.
#[uniffi::export]
pub fn open_repository(path: String) -> Result<Arc<HospitalCore>, HospitalError> {
    let db = Database::open(&path)?;
    Ok(Arc::new(HospitalCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

/// Create an in-memory database (for testing).
#[uniffi::export]
pub fn open_repository_in_memory() -> Result<Arc<HospitalCore>, HospitalError> {
    let db = Database::open_in_memory()?;
    Ok(Arc::new(HospitalCore {
        db: Arc::new(Mutex::new(db)),
    }))
}

// =========================================================================
// Main API Object
// =========================================================================

/// Thread-safe database wrapper for FFI.
#[derive(uniffi::Object)]
pub struct HospitalCore {
    db: Arc<Mutex<Database>>,
}

#[uniffi::export]
impl HospitalCore {
    /// List every appointment.
    pub fn get_all_appointments(&self) -> Result<Vec<FfiAppointmentWithId>, HospitalError> {
        let db = self.db.lock()?;
        let appointments = AppointmentRepository::new(&*db).get_all_appointments()?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// List appointments for a patient.
    pub fn get_appointments_by_patient_id(
        &self,
        patient_id: String,
    ) -> Result<Vec<FfiAppointmentWithId>, HospitalError> {
        let db = self.db.lock()?;
        let appointments =
            AppointmentRepository::new(&*db).get_appointments_by_patient_id(&patient_id)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// List appointments for a doctor.
    pub fn get_appointments_by_doctor_id(
        &self,
        doctor_id: String,
    ) -> Result<Vec<FfiAppointmentWithId>, HospitalError> {
        let db = self.db.lock()?;
        let appointments =
            AppointmentRepository::new(&*db).get_appointments_by_doctor_id(&doctor_id)?;
        Ok(appointments.into_iter().map(|a| a.into()).collect())
    }

    /// Create an appointment. Fails only on malformed input.
    pub fn create_appointment(
        &self,
        appointment: FfiAppointment,
    ) -> Result<FfiCreateOutcome, HospitalError> {
        let appointment = Appointment::try_from(appointment)?;
        let db = self.db.lock()?;
        let outcome = AppointmentRepository::new(&*db).create_appointment(&appointment);
        Ok(outcome.into())
    }

    /// Check whether an appointment belongs to a patient.
    pub fn appointment_belongs_to_patient(
        &self,
        patient_id: String,
        appointment_id: String,
    ) -> Result<bool, HospitalError> {
        let db = self.db.lock()?;
        Ok(AppointmentRepository::new(&*db)
            .appointment_belongs_to_patient(&patient_id, &appointment_id)?)
    }

    /// Delete an appointment (always unsupported).
    pub fn delete_appointment_by_id(&self, appointment_id: String) -> Result<(), HospitalError> {
        let db = self.db.lock()?;
        AppointmentRepository::new(&*db).delete_appointment_by_id(&appointment_id)?;
        Ok(())
    }

    /// Get an appointment by ID.
    pub fn get_appointment_by_id(
        &self,
        appointment_id: String,
    ) -> Result<Option<FfiAppointmentWithId>, HospitalError> {
        let db = self.db.lock()?;
        let appointment = AppointmentRepository::new(&*db).get_appointment_by_id(&appointment_id)?;
        Ok(appointment.map(|a| a.into()))
    }
}

// =========================================================================
// FFI Types
// =========================================================================

/// FFI-safe location.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiLocation {
    pub address: String,
    pub floor: String,
    pub room_number: String,
}

impl From<&Location> for FfiLocation {
    fn from(location: &Location) -> Self {
        Self {
            address: location.address().to_string(),
            floor: location.floor().to_string(),
            room_number: location.room_number().to_string(),
        }
    }
}

impl From<FfiLocation> for Location {
    fn from(location: FfiLocation) -> Self {
        Location::new(location.address, location.floor, location.room_number)
    }
}

/// FFI-safe appointment. Timestamps are RFC 3339 strings.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiAppointment {
    pub id: String,
    pub patient_id: String,
    pub appointment_date: String,
    pub doctor_id: String,
    pub content: String,
    /// "SUCCESS", "WAITING" or "FAILED"
    pub status: String,
    pub location: FfiLocation,
    pub date_created: String,
}

impl From<&Appointment> for FfiAppointment {
    fn from(appointment: &Appointment) -> Self {
        Self {
            id: appointment.id().to_string(),
            patient_id: appointment.patient_id().to_string(),
            appointment_date: appointment.appointment_date().to_rfc3339(),
            doctor_id: appointment.doctor_id().to_string(),
            content: appointment.content().to_string(),
            status: appointment.status().as_str().to_string(),
            location: appointment.location().into(),
            date_created: appointment.date_created().to_rfc3339(),
        }
    }
}

impl TryFrom<FfiAppointment> for Appointment {
    type Error = HospitalError;

    fn try_from(appointment: FfiAppointment) -> Result<Self, Self::Error> {
        let status = match appointment.status.as_str() {
            "SUCCESS" => AppointmentStatus::Success,
            "WAITING" => AppointmentStatus::Waiting,
            "FAILED" => AppointmentStatus::Failed,
            other => {
                return Err(HospitalError::InvalidInput(format!(
                    "Unknown appointment status: {}",
                    other
                )))
            }
        };

        Ok(Appointment::new(
            appointment.id,
            appointment.patient_id,
            parse_timestamp("appointment_date", &appointment.appointment_date)?,
            appointment.doctor_id,
            appointment.content,
            status,
            appointment.location.into(),
            parse_timestamp("date_created", &appointment.date_created)?,
        ))
    }
}

fn parse_timestamp(field: &str, value: &str) -> Result<DateTime<Utc>, HospitalError> {
    DateTime::parse_from_rfc3339(value)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| HospitalError::InvalidInput(format!("{}: {} ({})", field, value, e)))
}

/// FFI-safe appointment with its document key.
#[derive(Debug, Clone, PartialEq, uniffi::Record)]
pub struct FfiAppointmentWithId {
    pub id: String,
    pub appointment: FfiAppointment,
}

impl From<AppointmentWithId> for FfiAppointmentWithId {
    fn from(with_id: AppointmentWithId) -> Self {
        let (id, appointment) = with_id.into_parts();
        Self {
            id,
            appointment: (&appointment).into(),
        }
    }
}

/// FFI-safe create outcome.
#[derive(Debug, Clone, PartialEq, uniffi::Enum)]
pub enum FfiCreateOutcome {
    Created,
    EmptyId,
    PatientNotFound { patient_id: String },
    DoctorNotFound { doctor_id: String },
    DuplicateId { appointment_id: String },
    StoreFailed { message: String },
}

impl From<CreateOutcome> for FfiCreateOutcome {
    fn from(outcome: CreateOutcome) -> Self {
        match outcome {
            CreateOutcome::Created => FfiCreateOutcome::Created,
            CreateOutcome::Rejected(CreateRejection::EmptyId) => FfiCreateOutcome::EmptyId,
            CreateOutcome::Rejected(CreateRejection::PatientNotFound(patient_id)) => {
                FfiCreateOutcome::PatientNotFound { patient_id }
            }
            CreateOutcome::Rejected(CreateRejection::DoctorNotFound(doctor_id)) => {
                FfiCreateOutcome::DoctorNotFound { doctor_id }
            }
            CreateOutcome::Rejected(CreateRejection::DuplicateId(appointment_id)) => {
                FfiCreateOutcome::DuplicateId { appointment_id }
            }
            CreateOutcome::StoreFailed(message) => FfiCreateOutcome::StoreFailed { message },
        }
    }
}
