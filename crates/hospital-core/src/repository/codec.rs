//! Translation between stored documents and [`Appointment`]s.
//!
//! Stored layout (camelCase keys, timestamps as RFC 3339 strings):
//!
//! ```text
//! { id, patientId, appointmentDate, doctorId, content, status,
//!   location: { address, floor, roomNumber }, dateCreated }
//! ```

use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::db::{DbError, Document};
use crate::models::{Appointment, AppointmentStatus, Location};

/// A stored document that cannot be read back as an appointment.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("missing field `{0}`")]
    MissingField(&'static str),

    #[error("field `{field}` is not a {expected}")]
    WrongType {
        field: &'static str,
        expected: &'static str,
    },

    #[error("field `{field}` is not an RFC 3339 timestamp: {value}")]
    InvalidTimestamp { field: &'static str, value: String },
}

/// Encode an appointment as a document.
pub fn encode_appointment(appointment: &Appointment) -> Result<Document, DbError> {
    match serde_json::to_value(appointment)? {
        Value::Object(document) => Ok(document),
        _ => Err(DbError::Constraint(format!(
            "Appointment {} did not encode to an object",
            appointment.id()
        ))),
    }
}

/// Decode a document into an appointment.
pub fn decode_appointment(document: &Document) -> Result<Appointment, DecodeError> {
    let location = match document.get("location") {
        None | Some(Value::Null) => return Err(DecodeError::MissingField("location")),
        Some(Value::Object(location)) => Location::new(
            string_field(location, "address", "location.address")?,
            string_field(location, "floor", "location.floor")?,
            string_field(location, "roomNumber", "location.roomNumber")?,
        ),
        Some(_) => {
            return Err(DecodeError::WrongType {
                field: "location",
                expected: "map",
            })
        }
    };

    Ok(Appointment::new(
        string_field(document, "id", "id")?,
        string_field(document, "patientId", "patientId")?,
        timestamp_field(document, "appointmentDate")?,
        string_field(document, "doctorId", "doctorId")?,
        string_field(document, "content", "content")?,
        decode_status(document.get("status").and_then(Value::as_str)),
        location,
        timestamp_field(document, "dateCreated")?,
    ))
}

/// Map stored status text onto [`AppointmentStatus`].
///
/// Only the exact strings `SUCCESS` and `WAITING` are recognized; anything
/// else, including a missing status, reads as `Failed`.
pub fn decode_status(status: Option<&str>) -> AppointmentStatus {
    match status {
        Some("SUCCESS") => AppointmentStatus::Success,
        Some("WAITING") => AppointmentStatus::Waiting,
        _ => AppointmentStatus::Failed,
    }
}

fn string_field(
    map: &Document,
    key: &str,
    field: &'static str,
) -> Result<String, DecodeError> {
    match map.get(key) {
        None | Some(Value::Null) => Err(DecodeError::MissingField(field)),
        Some(Value::String(s)) => Ok(s.clone()),
        Some(_) => Err(DecodeError::WrongType {
            field,
            expected: "string",
        }),
    }
}

fn timestamp_field(map: &Document, field: &'static str) -> Result<DateTime<Utc>, DecodeError> {
    let raw = string_field(map, field, field)?;
    DateTime::parse_from_rfc3339(&raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|_| DecodeError::InvalidTimestamp { field, value: raw })
}
