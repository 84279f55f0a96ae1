use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use desalink_api::models::{
    AcceptedReading, CacheCounts, RealtimeResponse, SensorFamily, SensorStatus, ValveSnapshot, ValveStatus,
};
use desalink_api::{SensorId, TemperatureZone};
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::services::clock::Clock;
use crate::services::staleness::liveness;

#[derive(Debug, Clone, Copy)]
struct CacheEntry {
    value: f64,
    /// Monotonic receipt time, drives staleness
    received_at: Duration,
    /// Wall-clock capture time reported back to clients
    captured_at: OffsetDateTime,
}

/// One cached reading as seen at snapshot time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReadingSnapshot {
    pub sensor_id: SensorId,
    pub value: f64,
    pub status: SensorStatus,
    pub captured_at: OffsetDateTime,
}

/// Detached copy of the cache with liveness resolved.
#[derive(Debug, Clone)]
pub struct CacheSnapshot {
    pub readings: BTreeMap<SensorId, ReadingSnapshot>,
    pub valve: ValveSnapshot,
    pub last_update: Option<OffsetDateTime>,
    pub taken_at: OffsetDateTime,
}

impl CacheSnapshot {
    pub fn get(&self, sensor_id: &SensorId) -> Option<&ReadingSnapshot> {
        self.readings.get(sensor_id)
    }

    pub fn family(&self, family: SensorFamily) -> impl Iterator<Item = &ReadingSnapshot> {
        self.readings
            .values()
            .filter(move |reading| reading.sensor_id.family() == family)
    }

    /// Dashboard layout: temperature split by mounting zone, liveness as booleans.
    pub fn to_realtime(&self) -> RealtimeResponse {
        let mut response = RealtimeResponse {
            valve: self.valve,
            last_update: self.last_update,
            timestamp: Some(self.taken_at),
            ..Default::default()
        };

        for reading in self.readings.values() {
            let id = reading.sensor_id;
            let active = reading.status.is_active();
            let status = &mut response.sensor_status;

            let (values, flags) = match (id.family(), id.zone()) {
                (SensorFamily::Temperature, Some(TemperatureZone::Water)) => {
                    (&mut response.water_temperature, &mut status.water_temperature)
                }
                (SensorFamily::Temperature, _) => (&mut response.air_temperature, &mut status.air_temperature),
                (SensorFamily::Humidity, _) => (&mut response.humidity, &mut status.humidity),
                (SensorFamily::WaterLevel, _) => (&mut response.water_level, &mut status.water_level),
                (SensorFamily::WaterWeight, _) => (&mut response.water_weight, &mut status.water_weight),
            };

            values.insert(id, reading.value);
            flags.insert(id, active);
        }

        response
    }
}

/// Latest reading per sensor plus the valve state.
///
/// Each family map sits behind its own lock so writers to different families
/// never wait on each other. Entries are never evicted; staleness is derived
/// when a snapshot is taken.
pub struct CacheService {
    families: [RwLock<BTreeMap<SensorId, CacheEntry>>; 4],
    valve: RwLock<ValveSnapshot>,
    last_update: RwLock<Option<OffsetDateTime>>,
    clock: Arc<dyn Clock>,
}

impl CacheService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            families: std::array::from_fn(|_| RwLock::new(BTreeMap::new())),
            valve: RwLock::new(ValveSnapshot::default()),
            last_update: RwLock::new(None),
            clock,
        }
    }

    fn family_map(&self, family: SensorFamily) -> &RwLock<BTreeMap<SensorId, CacheEntry>> {
        &self.families[family as usize]
    }

    pub async fn upsert(&self, sensor_id: SensorId, value: f64, captured_at: OffsetDateTime) {
        let entry = CacheEntry {
            value,
            received_at: self.clock.monotonic(),
            captured_at,
        };

        self.family_map(sensor_id.family())
            .write()
            .await
            .insert(sensor_id, entry);

        self.touch(captured_at).await;
    }

    /// Stores a validated batch of one family under a single write guard.
    pub async fn upsert_batch(&self, family: SensorFamily, readings: &[AcceptedReading], captured_at: OffsetDateTime) {
        if readings.is_empty() {
            return;
        }

        let received_at = self.clock.monotonic();

        {
            let mut entries = self.family_map(family).write().await;
            for reading in readings.iter().filter(|r| r.sensor_id.family() == family) {
                entries.insert(
                    reading.sensor_id,
                    CacheEntry {
                        value: reading.value,
                        received_at,
                        captured_at,
                    },
                );
            }
        }

        self.touch(captured_at).await;
    }

    pub async fn set_valve(&self, status: ValveStatus, level: f64, captured_at: OffsetDateTime) {
        *self.valve.write().await = ValveSnapshot {
            status,
            level,
            timestamp: Some(captured_at),
        };

        self.touch(captured_at).await;
    }

    pub async fn valve(&self) -> ValveSnapshot {
        *self.valve.read().await
    }

    pub async fn last_update(&self) -> Option<OffsetDateTime> {
        *self.last_update.read().await
    }

    async fn touch(&self, captured_at: OffsetDateTime) {
        *self.last_update.write().await = Some(captured_at);
    }

    /// Copies every entry and resolves its liveness against `ttl`.
    pub async fn snapshot(&self, ttl: Duration) -> CacheSnapshot {
        let now = self.clock.monotonic();
        let mut readings = BTreeMap::new();

        for family in SensorFamily::ALL {
            let entries = self.family_map(family).read().await;
            readings.extend(entries.iter().map(|(sensor_id, entry)| {
                let snapshot = ReadingSnapshot {
                    sensor_id: *sensor_id,
                    value: entry.value,
                    status: liveness(now, entry.received_at, ttl),
                    captured_at: entry.captured_at,
                };
                (*sensor_id, snapshot)
            }));
        }

        CacheSnapshot {
            readings,
            valve: self.valve().await,
            last_update: self.last_update().await,
            taken_at: self.clock.now_utc(),
        }
    }

    /// Empties the sensor maps. The valve slot is kept.
    pub async fn clear(&self) {
        for family in SensorFamily::ALL {
            self.family_map(family).write().await.clear();
        }

        *self.last_update.write().await = None;
    }

    pub async fn stats(&self) -> CacheCounts {
        let mut counts = CacheCounts::default();

        for family in SensorFamily::ALL {
            let len = self.family_map(family).read().await.len();
            match family {
                SensorFamily::Temperature => counts.temperature_sensors = len,
                SensorFamily::Humidity => counts.humidity_sensors = len,
                SensorFamily::WaterLevel => counts.water_level_sensors = len,
                SensorFamily::WaterWeight => counts.water_weight_sensors = len,
            }
            counts.total_sensors += len;
        }

        counts
    }
}
