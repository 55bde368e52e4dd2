use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::MultiplexedConnection;

use crate::error::{Error, Result};
use crate::interfaces::metadata_source::MetadataSource;

/// Key-value source backed by Redis, where the metadata ingestion side
/// publishes venue blobs and the identity maps.
pub struct RedisMetadataSource {
    conn: MultiplexedConnection,
}

impl RedisMetadataSource {
    pub async fn connect(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(|e| Error::RedisError(e.to_string()))?;
        let conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| Error::RedisError(e.to_string()))?;

        Ok(RedisMetadataSource { conn })
    }
}

#[async_trait]
impl MetadataSource for RedisMetadataSource {
    async fn fetch(&self, key: &str) -> Result<Option<String>> {
        // the multiplexed connection is cheap to clone and shares one socket
        let mut conn = self.conn.clone();
        conn.get::<_, Option<String>>(key)
            .await
            .map_err(|e| Error::RedisError(e.to_string()))
    }
}
