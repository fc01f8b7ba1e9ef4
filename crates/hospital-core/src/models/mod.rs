//! Domain models for the hospital manager.

mod appointment;
mod location;

pub use appointment::*;
pub use location::*;
