use std::sync::Arc;

use async_trait::async_trait;
use sqlx::{Error, Sqlite, Transaction};
use time::{OffsetDateTime, UtcOffset};

use crate::configs::Storage;
use crate::errors::StorageError;
use crate::models::{NewSensorData, SensorData};
use crate::repositories::DurableStore;

pub struct SensorDataRepository {
    storage: Arc<Storage>,
}

impl SensorDataRepository {
    pub fn new(storage: Arc<Storage>) -> Self {
        Self { storage }
    }
}

impl SensorDataRepository {
    // Insert a reading and return the stored row
    pub async fn create(
        &self,
        item: &NewSensorData,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<SensorData, Error> {
        let record: SensorData = sqlx::query_as(
            r#"
            INSERT INTO sensor_data (sensor_id, sensor_type, value, unit, status, interval_seconds, time)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(item.sensor_id.to_string())
        .bind(item.sensor_type.as_str())
        .bind(item.value)
        .bind(&item.unit)
        .bind(item.status.as_str())
        .bind(item.interval_seconds.map(i64::from))
        .bind(item.time)
        .fetch_one(&mut **transaction)
        .await?;

        Ok(record)
    }

    pub async fn find_by_id(&self, id: i64) -> Result<Option<SensorData>, Error> {
        let record: Option<SensorData> = sqlx::query_as("SELECT * FROM sensor_data WHERE id = $1")
            .bind(id)
            .fetch_optional(self.storage.get_pool())
            .await?;

        Ok(record)
    }

    // Latest records over every sensor
    pub async fn find_latest(&self, limit: i64) -> Result<Vec<SensorData>, Error> {
        let records: Vec<SensorData> = sqlx::query_as(
            r#"
            SELECT * FROM sensor_data
            ORDER BY time DESC, id DESC
            LIMIT $1
            "#,
        )
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(records)
    }

    pub async fn find_by_sensor_id(&self, sensor_id: &str, limit: i64) -> Result<Vec<SensorData>, Error> {
        let records: Vec<SensorData> = sqlx::query_as(
            r#"
            SELECT * FROM sensor_data
            WHERE sensor_id = $1
            ORDER BY time DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(sensor_id)
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(records)
    }

    pub async fn find_by_sensor_type(&self, sensor_type: &str, limit: i64) -> Result<Vec<SensorData>, Error> {
        let records: Vec<SensorData> = sqlx::query_as(
            r#"
            SELECT * FROM sensor_data
            WHERE sensor_type = $1
            ORDER BY time DESC, id DESC
            LIMIT $2
            "#,
        )
        .bind(sensor_type)
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(records)
    }

    // Records captured inside the inclusive range, oldest first. Rows are
    // stored at UTC and compared as text, so the bounds are shifted to UTC too.
    pub async fn find_by_time_range(
        &self,
        start_time: OffsetDateTime,
        end_time: OffsetDateTime,
        limit: i64,
    ) -> Result<Vec<SensorData>, Error> {
        let records: Vec<SensorData> = sqlx::query_as(
            r#"
            SELECT * FROM sensor_data
            WHERE time >= $1 AND time <= $2
            ORDER BY time ASC, id ASC
            LIMIT $3
            "#,
        )
        .bind(start_time.to_offset(UtcOffset::UTC))
        .bind(end_time.to_offset(UtcOffset::UTC))
        .bind(limit)
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(records)
    }

    pub async fn find_oldest(&self) -> Result<Option<SensorData>, Error> {
        let record: Option<SensorData> = sqlx::query_as(
            r#"
            SELECT * FROM sensor_data
            ORDER BY time ASC, id ASC
            LIMIT 1
            "#,
        )
        .fetch_optional(self.storage.get_pool())
        .await?;

        Ok(record)
    }

    // Row count per stored type tag
    pub async fn count_by_sensor_type(&self) -> Result<Vec<(String, i64)>, Error> {
        let counts: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT sensor_type, COUNT(*) FROM sensor_data
            GROUP BY sensor_type
            ORDER BY sensor_type
            "#,
        )
        .fetch_all(self.storage.get_pool())
        .await?;

        Ok(counts)
    }

    pub async fn delete(&self, id: i64, transaction: &mut Transaction<'_, Sqlite>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM sensor_data WHERE id = $1")
            .bind(id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_all(&self, transaction: &mut Transaction<'_, Sqlite>) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM sensor_data")
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }

    pub async fn delete_by_sensor_id(
        &self,
        sensor_id: &str,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM sensor_data WHERE sensor_id = $1")
            .bind(sensor_id)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }

    // Manual saves carry no interval and are never matched
    pub async fn delete_by_interval(
        &self,
        interval_seconds: u32,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM sensor_data WHERE interval_seconds = $1")
            .bind(i64::from(interval_seconds))
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }

    // Air and water temperature share one tag, so both go together
    pub async fn delete_by_sensor_type(
        &self,
        sensor_type: &str,
        transaction: &mut Transaction<'_, Sqlite>,
    ) -> Result<u64, Error> {
        let result = sqlx::query("DELETE FROM sensor_data WHERE sensor_type = $1")
            .bind(sensor_type)
            .execute(&mut **transaction)
            .await?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl DurableStore for SensorDataRepository {
    async fn create_record(&self, record: &NewSensorData) -> Result<SensorData, StorageError> {
        let mut tx = self.storage.get_pool().begin().await?;
        let stored = self.create(record, &mut tx).await?;
        tx.commit().await?;

        Ok(stored)
    }
}
