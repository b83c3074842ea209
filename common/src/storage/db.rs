use crate::error::AppError;

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use surrealdb::{
    engine::any::{connect, Any},
    opt::auth::Root,
    Error, Surreal,
};

/// Table holding the raw key-value entries.
const KV_TABLE: &str = "kv";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct KvEntry {
    value: Vec<u8>,
}

#[derive(Clone)]
pub struct SurrealDbClient {
    pub client: Surreal<Any>,
}

impl SurrealDbClient {
    /// # Initialize a new database client
    ///
    /// # Arguments
    /// * `address` - Any SurrealDB address (`mem://`, `ws://host:port`, ...)
    /// * `credentials` - Root username and password; sign-in is skipped when `None`
    /// * `namespace`, `database` - Selected on the connection before returning
    ///
    /// # Returns
    /// * `SurrealDbClient` initialized
    pub async fn new(
        address: &str,
        credentials: Option<(&str, &str)>,
        namespace: &str,
        database: &str,
    ) -> Result<Self, Error> {
        let db = connect(address).await?;

        if let Some((username, password)) = credentials {
            db.signin(Root { username, password }).await?;
        }

        db.use_ns(namespace).use_db(database).await?;

        Ok(SurrealDbClient { client: db })
    }

    /// Cheap round trip used by the readiness probe.
    pub async fn ping(&self) -> Result<(), Error> {
        self.client.query("RETURN true").await.map(|_| ())
    }

    /// Reads the value stored under `key`.
    ///
    /// # Returns
    /// * `Ok(None)` when nothing is stored under the key
    pub async fn kv_get(&self, key: &[u8]) -> Result<Option<Vec<u8>>, AppError> {
        let entry: Option<KvEntry> = self.client.select((KV_TABLE, key_str(key)?)).await?;
        Ok(entry.map(|entry| entry.value))
    }

    /// Writes `value` under `key`, replacing any previous value.
    pub async fn kv_set(&self, key: &[u8], value: Vec<u8>) -> Result<(), AppError> {
        let _stored: Option<KvEntry> = self
            .client
            .upsert((KV_TABLE, key_str(key)?))
            .content(KvEntry { value })
            .await?;
        Ok(())
    }

    pub async fn kv_has(&self, key: &[u8]) -> Result<bool, AppError> {
        Ok(self.kv_get(key).await?.is_some())
    }
}

fn key_str(key: &[u8]) -> Result<&str, AppError> {
    std::str::from_utf8(key)
        .map_err(|_| AppError::Validation("key-value keys must be valid UTF-8".to_string()))
}

impl Deref for SurrealDbClient {
    type Target = Surreal<Any>;

    fn deref(&self) -> &Self::Target {
        &self.client
    }
}

#[cfg(any(test, feature = "test-utils"))]
impl SurrealDbClient {
    /// Create an in-memory SurrealDB client for testing.
    pub async fn memory(namespace: &str, database: &str) -> Result<Self, Error> {
        let db = connect("mem://").await?;

        db.use_ns(namespace).use_db(database).await?;

        Ok(SurrealDbClient { client: db })
    }
}
