#![cfg(feature = "postgres")]
use anyhow::Result;
use sqlx::{Pool, Postgres};
use wxlook_core::{RecordSink, WeatherRecord};

/// Postgres-backed weather log with the same flat row shape as the SQLite sink.
pub struct PostgresSink {
    pool: Pool<Postgres>,
}

impl PostgresSink {
    pub async fn new(url: &str) -> Result<Self> {
        let pool = sqlx::postgres::PgPoolOptions::new()
            .max_connections(5)
            .connect(url)
            .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS weather_log (
                id BIGSERIAL PRIMARY KEY,
                city TEXT NOT NULL,
                country TEXT,
                latitude DOUBLE PRECISION,
                longitude DOUBLE PRECISION,
                temperature DOUBLE PRECISION,
                feels_like DOUBLE PRECISION,
                humidity DOUBLE PRECISION,
                pressure DOUBLE PRECISION,
                wind_speed DOUBLE PRECISION,
                wind_direction DOUBLE PRECISION,
                condition TEXT NOT NULL,
                condition_code BIGINT,
                icon TEXT,
                visibility BIGINT,
                observation_time BIGINT NOT NULL,
                recorded_at BIGINT NOT NULL,
                requesting_user_id BIGINT NOT NULL
            );",
        )
        .execute(&pool)
        .await?;
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl RecordSink for PostgresSink {
    async fn append(&mut self, record: &WeatherRecord) -> Result<()> {
        sqlx::query(
            "INSERT INTO weather_log (
                city, country, latitude, longitude,
                temperature, feels_like, humidity, pressure,
                wind_speed, wind_direction,
                condition, condition_code, icon, visibility,
                observation_time, recorded_at, requesting_user_id
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)",
        )
        .bind(&record.city)
        .bind(&record.country)
        .bind(record.latitude)
        .bind(record.longitude)
        .bind(record.temperature)
        .bind(record.feels_like)
        .bind(record.humidity)
        .bind(record.pressure)
        .bind(record.wind_speed)
        .bind(record.wind_direction)
        .bind(&record.condition)
        .bind(record.condition_code)
        .bind(&record.icon)
        .bind(record.visibility)
        .bind(record.observation_time)
        .bind(record.recorded_at)
        .bind(record.requesting_user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
