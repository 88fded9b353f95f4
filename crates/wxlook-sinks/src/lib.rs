use anyhow::Result;
#[cfg(feature = "postgres")]
pub mod postgres;
#[cfg(feature = "sqlite")]
pub mod sqlite;

#[cfg(feature = "postgres")]
pub use postgres::PostgresSink;
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteSink;

use std::fs::{create_dir_all, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use wxlook_core::{RecordSink, WeatherRecord};

/// Append-only JSONL sink, one record per line.
pub struct FsSink {
    _dir: PathBuf,
    file: PathBuf,
}

impl FsSink {
    pub fn new<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        create_dir_all(&dir)?;
        let file = dir.join("records.jsonl");
        Ok(Self { _dir: dir, file })
    }
}

#[async_trait::async_trait]
impl RecordSink for FsSink {
    async fn append(&mut self, record: &WeatherRecord) -> Result<()> {
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.file)?;
        let line = serde_json::to_string(record)?;
        f.write_all(line.as_bytes())?;
        f.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
pub(crate) fn test_record(city: &str) -> WeatherRecord {
    WeatherRecord {
        city: city.to_string(),
        country: Some("ES".to_string()),
        latitude: Some(40.4165),
        longitude: Some(-3.7026),
        temperature: Some(21.4),
        feels_like: Some(20.9),
        humidity: Some(52.0),
        pressure: Some(1017.0),
        wind_speed: Some(3.6),
        wind_direction: Some(220.0),
        condition: "clear sky".to_string(),
        condition_code: Some(800),
        icon: Some("01d".to_string()),
        visibility: Some(10000),
        observation_time: 1_700_000_000,
        recorded_at: 1_700_000_060,
        requesting_user_id: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_jsonl() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = FsSink::new(dir.path()).unwrap();
        let record = test_record("Madrid");
        sink.append(&record).await.unwrap();
        sink.append(&record).await.unwrap();

        let content = std::fs::read_to_string(dir.path().join("records.jsonl")).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("\"Madrid\""));
    }
}
