//! Appointment models.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::location::Location;

/// Appointment status.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AppointmentStatus {
    /// Appointment took place
    Success,
    /// Appointment is scheduled and pending
    Waiting,
    /// Appointment did not happen or was cancelled
    Failed,
}

impl AppointmentStatus {
    /// Canonical stored text for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            AppointmentStatus::Success => "SUCCESS",
            AppointmentStatus::Waiting => "WAITING",
            AppointmentStatus::Failed => "FAILED",
        }
    }
}

/// An appointment between a patient and a doctor.
///
/// Built fully populated and never mutated afterwards. `patient_id` and
/// `doctor_id` are only checked against their stores when the appointment
/// is created.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Appointment {
    /// Caller-assigned ID, also used as the document key on create
    id: String,
    /// Patient document ID
    patient_id: String,
    /// When the appointment takes place
    appointment_date: DateTime<Utc>,
    /// Doctor document ID
    doctor_id: String,
    /// Free-text content
    content: String,
    status: AppointmentStatus,
    location: Location,
    /// When the record was created
    date_created: DateTime<Utc>,
}

impl Appointment {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        patient_id: impl Into<String>,
        appointment_date: DateTime<Utc>,
        doctor_id: impl Into<String>,
        content: impl Into<String>,
        status: AppointmentStatus,
        location: Location,
        date_created: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            patient_id: patient_id.into(),
            appointment_date,
            doctor_id: doctor_id.into(),
            content: content.into(),
            status,
            location,
            date_created,
        }
    }

    /// Schedule a new waiting appointment with a generated ID.
    pub fn schedule(
        patient_id: impl Into<String>,
        doctor_id: impl Into<String>,
        appointment_date: DateTime<Utc>,
        content: impl Into<String>,
        location: Location,
    ) -> Self {
        Self::new(
            uuid::Uuid::new_v4().to_string(),
            patient_id,
            appointment_date,
            doctor_id,
            content,
            AppointmentStatus::Waiting,
            location,
            Utc::now(),
        )
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn patient_id(&self) -> &str {
        &self.patient_id
    }

    pub fn appointment_date(&self) -> DateTime<Utc> {
        self.appointment_date
    }

    pub fn doctor_id(&self) -> &str {
        &self.doctor_id
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn status(&self) -> AppointmentStatus {
        self.status
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn date_created(&self) -> DateTime<Utc> {
        self.date_created
    }
}

/// An appointment paired with the key of the document it was read from.
///
/// The key is authoritative; `appointment.id()` is whatever the document
/// claims and may differ.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentWithId {
    id: String,
    appointment: Appointment,
}

impl AppointmentWithId {
    pub fn new(id: impl Into<String>, appointment: Appointment) -> Self {
        Self {
            id: id.into(),
            appointment,
        }
    }

    /// Document key in the store.
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn appointment(&self) -> &Appointment {
        &self.appointment
    }

    pub fn into_parts(self) -> (String, Appointment) {
        (self.id, self.appointment)
    }
}
