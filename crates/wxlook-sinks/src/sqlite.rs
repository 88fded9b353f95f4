use anyhow::Result;
use rusqlite::{params, Connection};
use wxlook_core::{RecordSink, WeatherRecord};

/// SQLite-backed weather log, one flat row per record.
pub struct SqliteSink {
    conn: Connection,
}

impl SqliteSink {
    pub fn new<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS weather_log (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                city TEXT NOT NULL,
                country TEXT,
                latitude REAL,
                longitude REAL,
                temperature REAL,
                feels_like REAL,
                humidity REAL,
                pressure REAL,
                wind_speed REAL,
                wind_direction REAL,
                condition TEXT NOT NULL,
                condition_code INTEGER,
                icon TEXT,
                visibility INTEGER,
                observation_time INTEGER NOT NULL,
                recorded_at INTEGER NOT NULL,
                requesting_user_id INTEGER NOT NULL
            );",
        )?;
        Ok(Self { conn })
    }

    pub fn insert_sync(&mut self, record: &WeatherRecord) -> Result<()> {
        self.conn.execute(
            "INSERT INTO weather_log (
                city, country, latitude, longitude,
                temperature, feels_like, humidity, pressure,
                wind_speed, wind_direction,
                condition, condition_code, icon, visibility,
                observation_time, recorded_at, requesting_user_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)",
            params![
                record.city,
                record.country,
                record.latitude,
                record.longitude,
                record.temperature,
                record.feels_like,
                record.humidity,
                record.pressure,
                record.wind_speed,
                record.wind_direction,
                record.condition,
                record.condition_code,
                record.icon,
                record.visibility,
                record.observation_time,
                record.recorded_at,
                record.requesting_user_id,
            ],
        )?;
        Ok(())
    }
}

// No await points inside, so the trait impl is a thin wrapper; Connection is
// Send, which is all the &mut receiver needs.
#[async_trait::async_trait]
impl RecordSink for SqliteSink {
    async fn append(&mut self, record: &WeatherRecord) -> Result<()> {
        self.insert_sync(record)
    }
}
