//! Appointment location.

use serde::Serialize;

/// Where an appointment takes place. Has no identity of its own.
#[derive(Debug, Clone, Serialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct Location {
    address: String,
    floor: String,
    room_number: String,
}

impl Location {
    pub fn new(
        address: impl Into<String>,
        floor: impl Into<String>,
        room_number: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            floor: floor.into(),
            room_number: room_number.into(),
        }
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn floor(&self) -> &str {
        &self.floor
    }

    pub fn room_number(&self) -> &str {
        &self.room_number
    }
}
