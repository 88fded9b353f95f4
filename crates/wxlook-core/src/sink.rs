use anyhow::Result;

use crate::WeatherRecord;

/// Append-only destination for successful lookups.
///
/// Implementations must not read rows back; a failed append never invalidates
/// the record the caller already holds.
#[async_trait::async_trait]
pub trait RecordSink: Send + Sync {
    async fn append(&mut self, record: &WeatherRecord) -> Result<()>;
}
