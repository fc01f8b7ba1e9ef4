//! Document store operations.

use rusqlite::{params, OptionalExtension};
use serde_json::{Map, Value};

use super::{Database, DbError, DbResult};

/// The fields of a stored document.
pub type Document = Map<String, Value>;

/// A document together with its key.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Document key within its collection
    pub id: String,
    pub data: Document,
}

/// Collection-scoped access to a schemaless document store.
///
/// Each call is an independent request; implementations give no
/// transactional guarantees across calls.
pub trait DocumentStore {
    /// Fetch a document by key.
    fn get(&self, collection: &str, id: &str) -> DbResult<Option<StoredDocument>>;

    /// Check whether a document exists.
    fn exists(&self, collection: &str, id: &str) -> DbResult<bool>;

    /// All documents in a collection, ordered by key.
    fn list(&self, collection: &str) -> DbResult<Vec<StoredDocument>>;

    /// Documents whose top-level string `field` equals `value`, ordered by key.
    fn query_eq(&self, collection: &str, field: &str, value: &str)
        -> DbResult<Vec<StoredDocument>>;

    /// Write a document, replacing any existing one under the same key.
    fn set(&self, collection: &str, id: &str, data: &Document) -> DbResult<()>;
}

impl DocumentStore for Database {
    fn get(&self, collection: &str, id: &str) -> DbResult<Option<StoredDocument>> {
        self.conn
            .query_row(
                r#"
                SELECT doc_id, body
                FROM documents
                WHERE collection = ?1 AND doc_id = ?2
                "#,
                params![collection, id],
                |row| {
                    Ok(DocumentRow {
                        doc_id: row.get(0)?,
                        body: row.get(1)?,
                    })
                },
            )
            .optional()?
            .map(|row| row.try_into())
            .transpose()
    }

    fn exists(&self, collection: &str, id: &str) -> DbResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM documents WHERE collection = ?1 AND doc_id = ?2",
                params![collection, id],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn list(&self, collection: &str) -> DbResult<Vec<StoredDocument>> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT doc_id, body
            FROM documents
            WHERE collection = ?
            ORDER BY doc_id
            "#,
        )?;

        let rows = stmt.query_map([collection], |row| {
            Ok(DocumentRow {
                doc_id: row.get(0)?,
                body: row.get(1)?,
            })
        })?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?.try_into()?);
        }
        Ok(documents)
    }

    fn query_eq(
        &self,
        collection: &str,
        field: &str,
        value: &str,
    ) -> DbResult<Vec<StoredDocument>> {
        let path = field_path(field)?;
        let mut stmt = self.conn.prepare(
            r#"
            SELECT doc_id, body
            FROM documents
            WHERE collection = ?1 AND json_extract(body, ?2) = ?3
            ORDER BY doc_id
            "#,
        )?;

        let rows = stmt.query_map(params![collection, path, value], |row| {
            Ok(DocumentRow {
                doc_id: row.get(0)?,
                body: row.get(1)?,
            })
        })?;

        let mut documents = Vec::new();
        for row in rows {
            documents.push(row?.try_into()?);
        }
        Ok(documents)
    }

    fn set(&self, collection: &str, id: &str, data: &Document) -> DbResult<()> {
        let body = serde_json::to_string(data)?;
        self.conn.execute(
            r#"
            INSERT INTO documents (collection, doc_id, body)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (collection, doc_id) DO UPDATE SET
                body = excluded.body,
                updated_at = datetime('now')
            "#,
            params![collection, id, body],
        )?;
        Ok(())
    }
}

/// Build a JSON path for a top-level field, rejecting anything but plain identifiers.
fn field_path(field: &str) -> DbResult<String> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(DbError::Constraint(format!(
            "Invalid document field name: {:?}",
            field
        )));
    }
    Ok(format!("$.{}", field))
}

/// Intermediate row struct for database mapping.
struct DocumentRow {
    doc_id: String,
    body: String,
}

impl TryFrom<DocumentRow> for StoredDocument {
    type Error = DbError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        match serde_json::from_str(&row.body)? {
            Value::Object(data) => Ok(StoredDocument {
                id: row.doc_id,
                data,
            }),
            _ => Err(DbError::Constraint(format!(
                "Document {} is not a JSON object",
                row.doc_id
            ))),
        }
    }
}
