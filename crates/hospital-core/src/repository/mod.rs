//! Appointment repository.
//!
//! Reads propagate store and decode failures to the caller. Creation never
//! fails outright: every outcome, including store failures, comes back as a
//! [`CreateOutcome`].
//!
//! Creation runs three existence checks and then a write as separate store
//! requests. Nothing makes them atomic, so two concurrent creates for the
//! same ID can both pass the duplicate check.

pub mod codec;

pub use codec::{decode_appointment, decode_status, encode_appointment, DecodeError};

use thiserror::Error;

use crate::db::{DbError, DocumentStore, StoredDocument};
use crate::models::{Appointment, AppointmentWithId};

/// Repository errors.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error("Store error: {0}")]
    Store(#[from] DbError),

    #[error("Malformed appointment document {id}: {source}")]
    Decode {
        id: String,
        #[source]
        source: DecodeError,
    },

    #[error("Unsupported operation: {0}")]
    Unsupported(&'static str),
}

pub type RepoResult<T> = Result<T, RepoError>;

/// Why a create was refused.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CreateRejection {
    #[error("Appointment id must not be empty")]
    EmptyId,

    #[error("Patient with id {0} does not exist")]
    PatientNotFound(String),

    #[error("Doctor with id {0} does not exist")]
    DoctorNotFound(String),

    #[error("Appointment with id {0} already exists")]
    DuplicateId(String),
}

/// Result of [`AppointmentRepository::create_appointment`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CreateOutcome {
    /// The appointment was written.
    Created,
    /// A referential check failed; nothing was written.
    Rejected(CreateRejection),
    /// The store failed during validation or the write.
    StoreFailed(String),
}

impl CreateOutcome {
    /// Whether the appointment was written.
    pub fn is_created(&self) -> bool {
        matches!(self, CreateOutcome::Created)
    }
}

/// Collection names used by the repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collections {
    pub appointments: String,
    pub patients: String,
    pub doctors: String,
}

impl Default for Collections {
    fn default() -> Self {
        Self {
            appointments: "appointments".to_string(),
            patients: "patient".to_string(),
            doctors: "doctor".to_string(),
        }
    }
}

/// Appointment operations over a document store.
pub struct AppointmentRepository<'a, S: DocumentStore + ?Sized> {
    store: &'a S,
    collections: Collections,
}

impl<'a, S: DocumentStore + ?Sized> AppointmentRepository<'a, S> {
    /// Create a repository using the default collection names.
    pub fn new(store: &'a S) -> Self {
        Self::with_collections(store, Collections::default())
    }

    pub fn with_collections(store: &'a S, collections: Collections) -> Self {
        Self { store, collections }
    }

    pub fn collections(&self) -> &Collections {
        &self.collections
    }

    /// Every appointment in the collection, in store order.
    pub fn get_all_appointments(&self) -> RepoResult<Vec<AppointmentWithId>> {
        let documents = self.store.list(&self.collections.appointments)?;
        tracing::debug!(count = documents.len(), "Listed appointments");
        decode_all(documents)
    }

    /// Appointments for one patient. An empty ID matches nothing.
    pub fn get_appointments_by_patient_id(
        &self,
        patient_id: &str,
    ) -> RepoResult<Vec<AppointmentWithId>> {
        self.query_by("patientId", patient_id)
    }

    /// Appointments for one doctor. An empty ID matches nothing.
    pub fn get_appointments_by_doctor_id(
        &self,
        doctor_id: &str,
    ) -> RepoResult<Vec<AppointmentWithId>> {
        self.query_by("doctorId", doctor_id)
    }

    /// Validate references and write a new appointment under its own ID.
    ///
    /// Checks, stopping at the first failure: the ID is not empty, the
    /// patient exists, the doctor exists, no appointment already uses the ID.
    pub fn create_appointment(&self, appointment: &Appointment) -> CreateOutcome {
        match self.try_create(appointment) {
            Ok(None) => {
                tracing::info!(appointment_id = appointment.id(), "Appointment created");
                CreateOutcome::Created
            }
            Ok(Some(rejection)) => {
                tracing::warn!(appointment_id = appointment.id(), "{rejection}");
                CreateOutcome::Rejected(rejection)
            }
            Err(e) => {
                tracing::error!(
                    appointment_id = appointment.id(),
                    "Failed to create appointment: {e}"
                );
                CreateOutcome::StoreFailed(e.to_string())
            }
        }
    }

    /// Whether the appointment exists and belongs to the patient.
    pub fn appointment_belongs_to_patient(
        &self,
        patient_id: &str,
        appointment_id: &str,
    ) -> RepoResult<bool> {
        Ok(self
            .get_appointment_by_id(appointment_id)?
            .is_some_and(|found| found.appointment().patient_id() == patient_id))
    }

    /// Deletion is not supported; the store is never touched.
    pub fn delete_appointment_by_id(&self, appointment_id: &str) -> RepoResult<()> {
        tracing::warn!(appointment_id, "Refusing to delete appointment");
        Err(RepoError::Unsupported("delete appointment"))
    }

    /// Fetch one appointment by document key.
    pub fn get_appointment_by_id(&self, id: &str) -> RepoResult<Option<AppointmentWithId>> {
        if id.is_empty() {
            return Ok(None);
        }
        self.store
            .get(&self.collections.appointments, id)?
            .map(decode_stored)
            .transpose()
    }

    fn query_by(&self, field: &str, value: &str) -> RepoResult<Vec<AppointmentWithId>> {
        if value.is_empty() {
            return Ok(Vec::new());
        }
        let documents = self
            .store
            .query_eq(&self.collections.appointments, field, value)?;
        tracing::debug!(field, value, count = documents.len(), "Queried appointments");
        decode_all(documents)
    }

    fn try_create(&self, appointment: &Appointment) -> Result<Option<CreateRejection>, DbError> {
        if appointment.id().is_empty() {
            return Ok(Some(CreateRejection::EmptyId));
        }
        if !self.exists(&self.collections.patients, appointment.patient_id())? {
            return Ok(Some(CreateRejection::PatientNotFound(
                appointment.patient_id().to_string(),
            )));
        }
        if !self.exists(&self.collections.doctors, appointment.doctor_id())? {
            return Ok(Some(CreateRejection::DoctorNotFound(
                appointment.doctor_id().to_string(),
            )));
        }
        if self.exists(&self.collections.appointments, appointment.id())? {
            return Ok(Some(CreateRejection::DuplicateId(
                appointment.id().to_string(),
            )));
        }

        let document = encode_appointment(appointment)?;
        self.store
            .set(&self.collections.appointments, appointment.id(), &document)?;
        Ok(None)
    }

    fn exists(&self, collection: &str, id: &str) -> Result<bool, DbError> {
        // An empty key never names a document.
        if id.is_empty() {
            return Ok(false);
        }
        self.store.exists(collection, id)
    }
}

fn decode_stored(document: StoredDocument) -> RepoResult<AppointmentWithId> {
    let appointment = decode_appointment(&document.data).map_err(|source| RepoError::Decode {
        id: document.id.clone(),
        source,
    })?;
    Ok(AppointmentWithId::new(document.id, appointment))
}

fn decode_all(documents: Vec<StoredDocument>) -> RepoResult<Vec<AppointmentWithId>> {
    documents.into_iter().map(decode_stored).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{Database, DbResult, Document};
    use crate::models::{AppointmentStatus, Location};
    use chrono::{TimeZone, Utc};
    use std::cell::Cell;

    /// Store that fails every request and counts how many it received.
    #[derive(Default)]
    struct UnreachableStore {
        calls: Cell<usize>,
    }

    impl UnreachableStore {
        fn fail<T>(&self) -> DbResult<T> {
            self.calls.set(self.calls.get() + 1);
            Err(DbError::Sqlite(rusqlite::Error::InvalidQuery))
        }
    }

    impl DocumentStore for UnreachableStore {
        fn get(&self, _: &str, _: &str) -> DbResult<Option<StoredDocument>> {
            self.fail()
        }
        fn exists(&self, _: &str, _: &str) -> DbResult<bool> {
            self.fail()
        }
        fn list(&self, _: &str) -> DbResult<Vec<StoredDocument>> {
            self.fail()
        }
        fn query_eq(&self, _: &str, _: &str, _: &str) -> DbResult<Vec<StoredDocument>> {
            self.fail()
        }
        fn set(&self, _: &str, _: &str, _: &Document) -> DbResult<()> {
            self.fail()
        }
    }

    fn appointment(id: &str, patient_id: &str, doctor_id: &str) -> Appointment {
        Appointment::new(
            id,
            patient_id,
            Utc.with_ymd_and_hms(2026, 11, 2, 9, 30, 0).unwrap(),
            doctor_id,
            "Checkup",
            AppointmentStatus::Waiting,
            Location::new("A", "2", "204"),
            Utc.with_ymd_and_hms(2026, 10, 19, 8, 0, 0).unwrap(),
        )
    }

    fn setup_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.set("patient", "p1", &Document::new()).unwrap();
        db.set("doctor", "d1", &Document::new()).unwrap();
        db
    }

    #[test]
    fn test_create_swallows_store_failure() {
        let store = UnreachableStore::default();
        let repo = AppointmentRepository::new(&store);

        let outcome = repo.create_appointment(&appointment("a1", "p1", "d1"));
        assert!(matches!(outcome, CreateOutcome::StoreFailed(_)));
        assert!(!outcome.is_created());
        // Stops at the first failed check
        assert_eq!(store.calls.get(), 1);
    }

    #[test]
    fn test_reads_propagate_store_failure() {
        let store = UnreachableStore::default();
        let repo = AppointmentRepository::new(&store);

        assert!(matches!(repo.get_all_appointments(), Err(RepoError::Store(_))));
        assert!(matches!(
            repo.get_appointments_by_patient_id("p1"),
            Err(RepoError::Store(_))
        ));
        assert!(matches!(
            repo.get_appointment_by_id("a1"),
            Err(RepoError::Store(_))
        ));
        assert!(matches!(
            repo.appointment_belongs_to_patient("p1", "a1"),
            Err(RepoError::Store(_))
        ));
    }

    #[test]
    fn test_delete_never_touches_store() {
        let store = UnreachableStore::default();
        let repo = AppointmentRepository::new(&store);

        assert!(matches!(
            repo.delete_appointment_by_id("a1"),
            Err(RepoError::Unsupported(_))
        ));
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn test_empty_ids_skip_the_store() {
        let store = UnreachableStore::default();
        let repo = AppointmentRepository::new(&store);

        assert!(repo.get_appointments_by_patient_id("").unwrap().is_empty());
        assert!(repo.get_appointments_by_doctor_id("").unwrap().is_empty());
        assert!(repo.get_appointment_by_id("").unwrap().is_none());
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn test_rejection_order() {
        let db = Database::open_in_memory().unwrap();
        let repo = AppointmentRepository::new(&db);

        // Neither patient nor doctor exists: patient is reported
        assert_eq!(
            repo.create_appointment(&appointment("a1", "p1", "d1")),
            CreateOutcome::Rejected(CreateRejection::PatientNotFound("p1".into()))
        );

        db.set("patient", "p1", &Document::new()).unwrap();
        assert_eq!(
            repo.create_appointment(&appointment("a1", "p1", "d1")),
            CreateOutcome::Rejected(CreateRejection::DoctorNotFound("d1".into()))
        );

        db.set("doctor", "d1", &Document::new()).unwrap();
        assert_eq!(
            repo.create_appointment(&appointment("a1", "p1", "d1")),
            CreateOutcome::Created
        );
        assert_eq!(
            repo.create_appointment(&appointment("a1", "p1", "d1")),
            CreateOutcome::Rejected(CreateRejection::DuplicateId("a1".into()))
        );
    }

    #[test]
    fn test_empty_patient_id_is_rejected() {
        let db = setup_db();
        let repo = AppointmentRepository::new(&db);

        assert_eq!(
            repo.create_appointment(&appointment("a1", "", "d1")),
            CreateOutcome::Rejected(CreateRejection::PatientNotFound(String::new()))
        );
    }

    #[test]
    fn test_empty_appointment_id_is_never_written() {
        let db = setup_db();
        db.set("patient", "p2", &Document::new()).unwrap();
        let repo = AppointmentRepository::new(&db);

        let first = appointment("", "p1", "d1");
        let second = appointment("", "p2", "d1");
        assert_eq!(
            repo.create_appointment(&first),
            CreateOutcome::Rejected(CreateRejection::EmptyId)
        );
        assert_eq!(
            repo.create_appointment(&second),
            CreateOutcome::Rejected(CreateRejection::EmptyId)
        );

        assert!(!db.exists("appointments", "").unwrap());
        assert!(repo.get_all_appointments().unwrap().is_empty());
    }

    #[test]
    fn test_empty_id_checked_before_store() {
        let store = UnreachableStore::default();
        let repo = AppointmentRepository::new(&store);

        assert_eq!(
            repo.create_appointment(&appointment("", "p1", "d1")),
            CreateOutcome::Rejected(CreateRejection::EmptyId)
        );
        assert_eq!(store.calls.get(), 0);
    }

    #[test]
    fn test_custom_collections() {
        let db = Database::open_in_memory().unwrap();
        db.set("patients", "p1", &Document::new()).unwrap();
        db.set("doctors", "d1", &Document::new()).unwrap();

        let repo = AppointmentRepository::with_collections(
            &db,
            Collections {
                appointments: "visits".into(),
                patients: "patients".into(),
                doctors: "doctors".into(),
            },
        );

        assert!(repo.create_appointment(&appointment("a1", "p1", "d1")).is_created());
        assert!(db.exists("visits", "a1").unwrap());
        assert!(!db.exists("appointments", "a1").unwrap());
    }

    #[test]
    fn test_decode_failure_names_document() {
        let db = setup_db();
        let mut doc = encode_appointment(&appointment("a1", "p1", "d1")).unwrap();
        doc.remove("location");
        db.set("appointments", "a1", &doc).unwrap();

        let repo = AppointmentRepository::new(&db);
        match repo.get_appointment_by_id("a1") {
            Err(RepoError::Decode { id, source }) => {
                assert_eq!(id, "a1");
                assert_eq!(source, DecodeError::MissingField("location"));
            }
            other => panic!("expected decode error, got {:?}", other),
        }
        assert!(repo.get_all_appointments().is_err());
    }

    #[test]
    fn test_rejection_messages() {
        assert_eq!(
            CreateRejection::PatientNotFound("p9".into()).to_string(),
            "Patient with id p9 does not exist"
        );
        assert_eq!(
            CreateRejection::DuplicateId("a1".into()).to_string(),
            "Appointment with id a1 already exists"
        );
    }
}
