// Document repository - every read and write against the document store goes through here
use async_trait::async_trait;
use rusqlite::{params, params_from_iter, Connection, TransactionBehavior};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::db::DbPool;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Database not available")]
    Unavailable,

    #[error("Pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("SQL error: {0}")]
    Sql(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Documents must serialize to a JSON object")]
    NotAnObject,
}

/// A stored document: the storage-assigned id plus its JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: String,
    pub body: Map<String, Value>,
}

impl Document {
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.body.get(key).and_then(Value::as_str)
    }

    /// Body with the storage id exposed as a public `id` field.
    pub fn into_public(self) -> Map<String, Value> {
        let mut body = self.body;
        body.remove("_id");
        body.insert("id".to_string(), Value::String(self.id));
        body
    }
}

/// Top-level equality filter, all clauses ANDed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter {
    clauses: Vec<(String, Value)>,
}

impl Filter {
    pub fn eq(field: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and_eq(field, value)
    }

    pub fn and_eq(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.clauses.push((field.into(), value.into()));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }
}

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Insert one document, returning its generated id
    async fn insert_one(
        &self,
        collection: &str,
        body: Map<String, Value>,
    ) -> Result<String, StorageError>;

    /// All documents in insertion order
    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StorageError>;

    /// First document matching the filter
    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StorageError>;

    /// Insert all bodies in one transaction, only if the collection is empty.
    /// Returns whether anything was inserted.
    async fn seed_if_empty(
        &self,
        collection: &str,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<bool, StorageError>;

    /// Names of collections holding at least one document, sorted
    async fn list_collections(&self) -> Result<Vec<String>, StorageError>;
}

/// SQLite implementation
pub struct SqliteDocumentRepository {
    pool: DbPool,
    database: String,
}

impl SqliteDocumentRepository {
    pub fn new(pool: DbPool, database: impl Into<String>) -> Self {
        Self {
            pool,
            database: database.into(),
        }
    }

    fn insert_row(
        &self,
        conn: &Connection,
        collection: &str,
        body: &Map<String, Value>,
    ) -> Result<String, StorageError> {
        let id = uuid::Uuid::now_v7().to_string();
        let body_json = serde_json::to_string(body)?;

        conn.execute(
            "INSERT INTO documents (id, db_name, collection, body) VALUES (?1, ?2, ?3, ?4)",
            params![id, self.database, collection, body_json],
        )?;

        Ok(id)
    }
}

fn decode_rows(rows: Vec<(String, String)>) -> Result<Vec<Document>, StorageError> {
    rows.into_iter()
        .map(|(id, body)| {
            Ok(Document {
                id,
                body: serde_json::from_str(&body)?,
            })
        })
        .collect()
}

fn json_path(field: &str) -> Result<String, StorageError> {
    let valid = !field.is_empty()
        && field
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(StorageError::InvalidFilter(format!(
            "unsupported field name {:?}",
            field
        )));
    }
    Ok(format!("$.{}", field))
}

#[async_trait]
impl DocumentRepository for SqliteDocumentRepository {
    async fn insert_one(
        &self,
        collection: &str,
        body: Map<String, Value>,
    ) -> Result<String, StorageError> {
        let conn = self.pool.get()?;
        self.insert_row(&conn, collection, &body)
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Document>, StorageError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT id, body FROM documents
             WHERE db_name = ?1 AND collection = ?2
             ORDER BY seq",
        )?;
        let rows = stmt
            .query_map(params![self.database, collection], |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<Result<Vec<(String, String)>, _>>()?;

        decode_rows(rows)
    }

    async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StorageError> {
        let mut sql = String::from(
            "SELECT id, body FROM documents WHERE db_name = ?1 AND collection = ?2",
        );
        let mut values = vec![self.database.clone(), collection.to_string()];

        for (field, value) in &filter.clauses {
            let next = values.len() + 1;
            sql.push_str(&format!(
                " AND json_extract(body, ?{}) = json_extract(?{}, '$')",
                next,
                next + 1
            ));
            values.push(json_path(field)?);
            values.push(serde_json::to_string(value)?);
        }
        sql.push_str(" ORDER BY seq LIMIT 1");

        let conn = self.pool.get()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok((row.get(0)?, row.get(1)?))
            })?
            .collect::<Result<Vec<(String, String)>, _>>()?;

        Ok(decode_rows(rows)?.into_iter().next())
    }

    async fn seed_if_empty(
        &self,
        collection: &str,
        bodies: Vec<Map<String, Value>>,
    ) -> Result<bool, StorageError> {
        let mut conn = self.pool.get()?;

        // IMMEDIATE takes the write lock up front so two first readers cannot both seed.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let existing: i64 = tx.query_row(
            "SELECT COUNT(*) FROM documents WHERE db_name = ?1 AND collection = ?2",
            params![self.database, collection],
            |row| row.get(0),
        )?;
        if existing > 0 {
            return Ok(false);
        }

        for body in &bodies {
            self.insert_row(&tx, collection, body)?;
        }
        tx.commit()?;

        Ok(true)
    }

    async fn list_collections(&self) -> Result<Vec<String>, StorageError> {
        let conn = self.pool.get()?;

        let mut stmt = conn.prepare(
            "SELECT DISTINCT collection FROM documents WHERE db_name = ?1 ORDER BY collection",
        )?;
        let names = stmt
            .query_map(params![self.database], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;

        Ok(names)
    }
}
