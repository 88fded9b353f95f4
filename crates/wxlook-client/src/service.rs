use tokio::sync::Mutex;
use wxlook_core::{RecordSink, WeatherRecord};

use crate::{FetchError, WeatherClient};

/// The client plus the record log.
///
/// Every successful fetch is appended to the sink. A failed append is logged
/// and swallowed: durability of the log entry is best-effort and must not
/// take the already-computed record away from the caller.
pub struct WeatherService {
    client: WeatherClient,
    sink: Mutex<Box<dyn RecordSink>>,
}

impl WeatherService {
    pub fn new(client: WeatherClient, sink: Box<dyn RecordSink>) -> Self {
        Self {
            client,
            sink: Mutex::new(sink),
        }
    }

    pub fn client(&self) -> &WeatherClient {
        &self.client
    }

    /// Swap in a reconfigured client after a settings change.
    pub fn set_client(&mut self, client: WeatherClient) {
        self.client = client;
    }

    pub async fn lookup(&self, city: &str, user_id: i64) -> Result<WeatherRecord, FetchError> {
        let record = self.client.fetch(city, user_id).await?;

        let mut sink = self.sink.lock().await;
        match sink.append(&record).await {
            Ok(()) => {
                tracing::info!(city = %record.city, "weather record saved");
            }
            Err(e) => {
                tracing::error!(error = ?e, city = %record.city, "failed to save weather record");
            }
        }

        Ok(record)
    }
}
