use std::sync::Arc;

use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::db::documents::{Document, DocumentRepository, Filter, StorageError};

/// How many collection names diagnostics will report.
pub const COLLECTION_LISTING_LIMIT: usize = 10;

/// Facade over the document store.
///
/// When no store is configured the gateway runs degraded: reads come back
/// empty and writes fail with [`StorageError::Unavailable`].
#[derive(Clone)]
pub struct Gateway {
    repo: Option<Arc<dyn DocumentRepository>>,
}

/// Snapshot of the store for the diagnostics endpoint.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreStatus {
    Disconnected,
    Connected {
        collections: Result<Vec<String>, String>,
    },
}

impl Gateway {
    pub fn new(repo: Arc<dyn DocumentRepository>) -> Self {
        Self { repo: Some(repo) }
    }

    pub fn disconnected() -> Self {
        Self { repo: None }
    }

    pub fn is_connected(&self) -> bool {
        self.repo.is_some()
    }

    fn repo(&self) -> Result<&Arc<dyn DocumentRepository>, StorageError> {
        self.repo.as_ref().ok_or(StorageError::Unavailable)
    }

    /// Serialize and insert a record, returning the storage-assigned id.
    pub async fn create_document<T: Serialize>(
        &self,
        collection: &str,
        record: &T,
    ) -> Result<String, StorageError> {
        let repo = self.repo()?;
        let body = stamped(record)?;
        repo.insert_one(collection, body).await
    }

    pub async fn get_documents(&self, collection: &str) -> Result<Vec<Document>, StorageError> {
        match &self.repo {
            Some(repo) => repo.find_all(collection).await,
            None => Ok(Vec::new()),
        }
    }

    pub async fn find_one(
        &self,
        collection: &str,
        filter: &Filter,
    ) -> Result<Option<Document>, StorageError> {
        match &self.repo {
            Some(repo) => repo.find_one(collection, filter).await,
            None => Ok(None),
        }
    }

    /// Insert the records only if the collection holds nothing yet.
    pub async fn seed_if_empty<T: Serialize>(
        &self,
        collection: &str,
        records: &[T],
    ) -> Result<bool, StorageError> {
        let Some(repo) = &self.repo else {
            return Ok(false);
        };
        let bodies = records.iter().map(stamped).collect::<Result<Vec<_>, _>>()?;
        repo.seed_if_empty(collection, bodies).await
    }

    pub async fn status(&self) -> StoreStatus {
        let Some(repo) = &self.repo else {
            return StoreStatus::Disconnected;
        };

        let collections = repo
            .list_collections()
            .await
            .map(|mut names| {
                names.truncate(COLLECTION_LISTING_LIMIT);
                names
            })
            .map_err(|e| e.to_string());

        StoreStatus::Connected { collections }
    }
}

/// Serialize a record to a JSON object carrying creation timestamps.
fn stamped<T: Serialize>(record: &T) -> Result<Map<String, Value>, StorageError> {
    let Value::Object(mut body) = serde_json::to_value(record)? else {
        return Err(StorageError::NotAnObject);
    };

    let now = Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true));
    body.entry("created_at").or_insert_with(|| now.clone());
    body.entry("updated_at").or_insert(now);

    Ok(body)
}
