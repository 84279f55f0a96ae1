use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use desalink_api::models::{LoggerConfigRequest, LoggerStatus, SensorFamily};
use tokio::sync::{Mutex, RwLock, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, Interval, MissedTickBehavior};

use crate::errors::LoggerError;
use crate::models::NewSensorData;
use crate::repositories::DurableStore;
use crate::services::cache_service::{CacheService, CacheSnapshot};
use crate::services::logger_config::LoggerConfiguration;
use crate::services::staleness::CACHE_TTL;

/// Outcome of one logging cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleReport {
    /// Cycle count after this cycle completed
    pub cycle: u64,
    pub persisted: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlushReport {
    pub saved: usize,
    pub failed: usize,
}

struct TimerHandle {
    stop: oneshot::Sender<()>,
    period: watch::Sender<Duration>,
    task: JoinHandle<()>,
}

struct LoggerInner {
    cache: Arc<CacheService>,
    store: Arc<dyn DurableStore>,
    configuration: RwLock<LoggerConfiguration>,
    cycles: AtomicU64,
    cycle_gate: Mutex<()>,
}

/// Periodically copies selected cache entries into the durable store.
///
/// A single timer task runs cycles inline, so a slow cycle delays the next
/// tick instead of overlapping it. Ticks that find another cycle still
/// draining are skipped.
pub struct LoggerService {
    inner: Arc<LoggerInner>,
    timer: Mutex<Option<TimerHandle>>,
}

impl LoggerService {
    pub fn new(cache: Arc<CacheService>, store: Arc<dyn DurableStore>, configuration: LoggerConfiguration) -> Self {
        Self {
            inner: Arc::new(LoggerInner {
                cache,
                store,
                configuration: RwLock::new(configuration),
                cycles: AtomicU64::new(0),
                cycle_gate: Mutex::new(()),
            }),
            timer: Mutex::new(None),
        }
    }

    /// Arms the timer. Returns `false` when it was already running.
    pub async fn start(&self) -> bool {
        let mut timer = self.timer.lock().await;

        if timer.is_some() {
            tracing::info!("logger already running");
            return false;
        }

        let period = self.inner.configuration.read().await.interval();
        self.inner.cycles.store(0, Ordering::SeqCst);

        let (stop_tx, stop_rx) = oneshot::channel();
        let (period_tx, period_rx) = watch::channel(period);
        let task = tokio::spawn(run_timer(self.inner.clone(), stop_rx, period_rx));

        *timer = Some(TimerHandle {
            stop: stop_tx,
            period: period_tx,
            task,
        });

        tracing::info!(interval_ms = period.as_millis() as u64, "logger started");

        true
    }

    /// Disarms the timer without waiting for an in-flight cycle.
    /// Returns `false` when it was not running.
    pub async fn stop(&self) -> bool {
        let Some(handle) = self.timer.lock().await.take() else {
            tracing::info!("logger already stopped");
            return false;
        };

        if handle.stop.send(()).is_err() {
            tracing::warn!(finished = handle.task.is_finished(), "logger timer had already exited");
        }

        tracing::info!(cycles = self.inner.cycles.load(Ordering::SeqCst), "logger stopped");

        true
    }

    pub async fn is_running(&self) -> bool {
        self.timer.lock().await.is_some()
    }

    pub async fn set_interval(&self, interval_ms: u64) -> Result<(), LoggerError> {
        self.inner.configuration.write().await.set_interval(interval_ms)?;
        self.rearm(Duration::from_millis(interval_ms)).await;
        Ok(())
    }

    /// Applies interval and selection changes; cycles pick them up on their next run.
    pub async fn set_configuration(&self, request: &LoggerConfigRequest) -> Result<(), LoggerError> {
        let interval = self.inner.configuration.write().await.apply(request)?;

        if let Some(interval) = interval {
            self.rearm(interval).await;
        }

        tracing::info!(?request, "logger configuration updated");

        Ok(())
    }

    async fn rearm(&self, period: Duration) {
        if let Some(handle) = self.timer.lock().await.as_ref() {
            // the receiver only goes away together with the timer task
            let _ = handle.period.send(period);
        }
    }

    pub async fn status(&self) -> LoggerStatus {
        let is_logging = self.is_running().await;
        let configuration = self.inner.configuration.read().await.clone();

        let families = SensorFamily::PERSISTABLE;

        LoggerStatus {
            is_logging,
            interval: configuration.interval_ms(),
            log_count: self.inner.cycles.load(Ordering::SeqCst),
            enabled_sensor_types: families
                .iter()
                .map(|family| (*family, configuration.selection(*family).is_enabled()))
                .collect(),
            active_sensors: families
                .iter()
                .map(|family| (*family, configuration.sensors_for(*family)))
                .collect(),
            selection: families
                .iter()
                .map(|family| (*family, configuration.selection(*family).to_string()))
                .collect(),
        }
    }

    /// Runs one cycle now. Returns `None` when another cycle holds the gate.
    pub async fn run_cycle(&self) -> Option<CycleReport> {
        self.inner.run_cycle().await
    }

    /// Persists every cached persistable reading once, ignoring the selection.
    pub async fn flush_cache(&self) -> FlushReport {
        let snapshot = self.inner.cache.snapshot(CACHE_TTL).await;

        let records: Vec<NewSensorData> = SensorFamily::PERSISTABLE
            .into_iter()
            .flat_map(|family| snapshot.family(family))
            .map(|reading| NewSensorData::new(reading.sensor_id, reading.value, reading.status, None, snapshot.taken_at))
            .collect();

        let (saved, failed) = self.inner.persist(&records).await;

        tracing::info!(saved, failed, "cache flushed to storage");

        FlushReport { saved, failed }
    }
}

impl LoggerInner {
    async fn run_cycle(&self) -> Option<CycleReport> {
        let Ok(_gate) = self.cycle_gate.try_lock() else {
            tracing::warn!("previous logging cycle still running, tick skipped");
            return None;
        };

        let configuration = self.configuration.read().await.clone();
        let snapshot = self.cache.snapshot(CACHE_TTL).await;
        let records = build_records(&configuration, &snapshot);

        let (persisted, failed) = self.persist(&records).await;
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;

        tracing::debug!(cycle, persisted, failed, "logging cycle complete");

        Some(CycleReport {
            cycle,
            persisted,
            failed,
        })
    }

    async fn persist(&self, records: &[NewSensorData]) -> (usize, usize) {
        let mut persisted = 0;
        let mut failed = 0;

        for record in records {
            match self.store.create_record(record).await {
                Ok(_) => persisted += 1,
                Err(e) => {
                    tracing::error!(sensor_id = %record.sensor_id, error = %e, "failed to persist reading");
                    failed += 1;
                }
            }
        }

        (persisted, failed)
    }
}

/// Records for every selected sensor present in the snapshot.
///
/// Stale entries are kept and tagged inactive.
pub fn build_records(configuration: &LoggerConfiguration, snapshot: &CacheSnapshot) -> Vec<NewSensorData> {
    let interval_seconds = configuration.interval_seconds();

    SensorFamily::PERSISTABLE
        .into_iter()
        .flat_map(|family| configuration.sensors_for(family))
        .filter_map(|sensor_id| snapshot.get(&sensor_id))
        .map(|reading| {
            NewSensorData::new(
                reading.sensor_id,
                reading.value,
                reading.status,
                Some(interval_seconds),
                snapshot.taken_at,
            )
        })
        .collect()
}

fn ticker(period: Duration) -> Interval {
    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    interval
}

async fn run_timer(inner: Arc<LoggerInner>, mut stop: oneshot::Receiver<()>, mut period: watch::Receiver<Duration>) {
    let mut interval = ticker(*period.borrow_and_update());

    loop {
        tokio::select! {
            biased;

            _ = &mut stop => break,
            changed = period.changed() => {
                if changed.is_err() {
                    break;
                }
                let next = *period.borrow_and_update();
                tracing::info!(interval_ms = next.as_millis() as u64, "logger timer re-armed");
                interval = ticker(next);
            }
            _ = interval.tick() => {
                inner.run_cycle().await;
            }
        }
    }

    tracing::debug!("logger timer exited");
}

#[cfg(test)]
mod tests {
    use desalink_api::SensorId;
    use desalink_api::models::SelectionInput;

    use crate::mock::MemoryStore;
    use crate::services::clock::{Clock, ManualClock};

    use super::*;

    struct Fixture {
        clock: Arc<ManualClock>,
        cache: Arc<CacheService>,
        store: Arc<MemoryStore>,
        logger: LoggerService,
    }

    fn fixture_with(store: MemoryStore) -> Fixture {
        let clock = Arc::new(ManualClock::new());
        let cache = Arc::new(CacheService::new(clock.clone()));
        let store = Arc::new(store);
        let logger = LoggerService::new(cache.clone(), store.clone(), LoggerConfiguration::default());

        Fixture {
            clock,
            cache,
            store,
            logger,
        }
    }

    fn fixture() -> Fixture {
        fixture_with(MemoryStore::new())
    }

    fn id(family: SensorFamily, raw: &str) -> SensorId {
        SensorId::parse(family, raw).unwrap()
    }

    fn select(family: SensorFamily, input: SelectionInput) -> LoggerConfigRequest {
        let mut request = LoggerConfigRequest::default();
        match family {
            SensorFamily::Temperature => request.temperature = Some(input),
            SensorFamily::Humidity => request.humidity = Some(input),
            SensorFamily::WaterWeight => request.water_weight = Some(input),
            SensorFamily::WaterLevel => request.water_level = Some(input),
        }
        request
    }

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_cycle_persists_selected_reading() {
        let f = fixture();
        f.cache
            .upsert(id(SensorFamily::Temperature, "T1"), 25.5, f.clock.now_utc())
            .await;

        let report = f.logger.run_cycle().await.unwrap();
        assert_eq!(report, CycleReport { cycle: 1, persisted: 1, failed: 0 });

        let records = f.store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sensor_id, "T1");
        assert_eq!(records[0].sensor_type, "temperature");
        assert_eq!(records[0].value, 25.5);
        assert_eq!(records[0].unit, "°C");
        assert_eq!(records[0].status, "active");
        assert_eq!(records[0].interval_seconds, Some(5));
    }

    #[tokio::test]
    async fn test_water_level_is_never_persisted() {
        let f = fixture();
        f.cache
            .upsert(id(SensorFamily::WaterLevel, "WL1"), 80.0, f.clock.now_utc())
            .await;
        f.cache
            .upsert(id(SensorFamily::WaterWeight, "WW1"), 120.0, f.clock.now_utc())
            .await;

        f.logger.run_cycle().await.unwrap();
        f.logger.flush_cache().await;

        let records = f.store.records().await;
        assert_eq!(records.len(), 2);
        assert!(records.iter().all(|record| record.sensor_id == "WW1"));
    }

    #[tokio::test]
    async fn test_selection_none_skips_family() {
        let f = fixture();
        let now = f.clock.now_utc();
        f.cache.upsert(id(SensorFamily::Humidity, "RH1"), 50.0, now).await;
        f.cache.upsert(id(SensorFamily::Temperature, "T2"), 20.0, now).await;

        f.logger
            .set_configuration(&select(SensorFamily::Humidity, "none".into()))
            .await
            .unwrap();

        let report = f.logger.run_cycle().await.unwrap();
        assert_eq!(report.persisted, 1);
        assert_eq!(f.store.records().await[0].sensor_id, "T2");
    }

    #[tokio::test]
    async fn test_single_sensor_selection() {
        let f = fixture();
        let now = f.clock.now_utc();
        f.cache.upsert(id(SensorFamily::Temperature, "T5"), 30.0, now).await;
        f.cache.upsert(id(SensorFamily::Temperature, "T6"), 31.0, now).await;

        f.logger
            .set_configuration(&select(SensorFamily::Temperature, "T5".into()))
            .await
            .unwrap();

        f.logger.run_cycle().await.unwrap();

        let records = f.store.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].sensor_id, "T5");

        let status = f.logger.status().await;
        assert_eq!(status.selection[&SensorFamily::Temperature], "T5");
        assert_eq!(status.active_sensors[&SensorFamily::Temperature].len(), 1);
    }

    #[tokio::test]
    async fn test_stale_reading_is_persisted_as_inactive() {
        let f = fixture();
        f.cache
            .upsert(id(SensorFamily::Humidity, "RH4"), 61.257, f.clock.now_utc())
            .await;

        f.clock.advance(Duration::from_secs(31));
        f.logger.run_cycle().await.unwrap();

        let records = f.store.records().await;
        assert_eq!(records[0].status, "inactive");
        assert_eq!(records[0].value, 61.26);
    }

    #[tokio::test]
    async fn test_failed_write_does_not_abort_cycle() {
        let f = fixture_with(MemoryStore::new().failing_on("T1"));
        let now = f.clock.now_utc();
        f.cache.upsert(id(SensorFamily::Temperature, "T1"), 20.0, now).await;
        f.cache.upsert(id(SensorFamily::Temperature, "T2"), 21.0, now).await;

        let report = f.logger.run_cycle().await.unwrap();
        assert_eq!(report, CycleReport { cycle: 1, persisted: 1, failed: 1 });
        assert_eq!(f.store.records().await[0].sensor_id, "T2");
    }

    #[tokio::test(start_paused = true)]
    async fn test_double_start_keeps_one_timer() {
        let f = fixture();

        assert!(f.logger.start().await);
        assert!(!f.logger.start().await);

        tokio::time::sleep(Duration::from_millis(5000 * 3 + 100)).await;
        settle().await;

        assert_eq!(f.logger.status().await.log_count, 3);
        assert!(f.logger.stop().await);
        assert!(!f.logger.stop().await);

        tokio::time::sleep(Duration::from_secs(20)).await;
        settle().await;

        let status = f.logger.status().await;
        assert!(!status.is_logging);
        assert_eq!(status.log_count, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_resets_counter() {
        let f = fixture();

        f.logger.start().await;
        tokio::time::sleep(Duration::from_millis(10_100)).await;
        settle().await;
        assert_eq!(f.logger.status().await.log_count, 2);

        f.logger.stop().await;
        f.logger.start().await;
        assert_eq!(f.logger.status().await.log_count, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_interval_rearms_running_timer() {
        let f = fixture();

        f.logger.start().await;
        f.logger.set_interval(1000).await.unwrap();
        settle().await;

        tokio::time::sleep(Duration::from_millis(3100)).await;
        settle().await;

        let status = f.logger.status().await;
        assert_eq!(status.interval, 1000);
        assert_eq!(status.log_count, 3);

        assert_eq!(f.logger.set_interval(0).await, Err(LoggerError::InvalidInterval));
    }

    #[tokio::test(start_paused = true)]
    async fn test_overlapping_cycles_are_skipped() {
        let f = fixture_with(MemoryStore::new().with_delay(Duration::from_secs(2)));
        f.cache
            .upsert(id(SensorFamily::Temperature, "T1"), 20.0, f.clock.now_utc())
            .await;

        let logger = Arc::new(f.logger);
        let first = tokio::spawn({
            let logger = logger.clone();
            async move { logger.run_cycle().await }
        });
        settle().await;

        assert_eq!(logger.run_cycle().await, None);

        let report = first.await.unwrap().unwrap();
        assert_eq!(report.cycle, 1);
        assert_eq!(f.store.max_in_flight(), 1);
        assert_eq!(logger.status().await.log_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_lets_in_flight_cycle_drain() {
        let f = fixture_with(MemoryStore::new().with_delay(Duration::from_secs(3)));
        f.cache
            .upsert(id(SensorFamily::Temperature, "T1"), 20.0, f.clock.now_utc())
            .await;

        f.logger.start().await;
        tokio::time::sleep(Duration::from_millis(5100)).await;
        settle().await;

        assert!(f.logger.stop().await);
        assert!(f.store.records().await.is_empty());

        tokio::time::sleep(Duration::from_secs(5)).await;
        settle().await;

        assert_eq!(f.store.records().await.len(), 1);
        assert_eq!(f.logger.status().await.log_count, 1);
    }

    #[tokio::test]
    async fn test_flush_does_not_touch_counter() {
        let f = fixture();
        f.cache
            .upsert(id(SensorFamily::WaterWeight, "WW2"), 10.0, f.clock.now_utc())
            .await;

        let report = f.logger.flush_cache().await;
        assert_eq!(report, FlushReport { saved: 1, failed: 0 });
        assert_eq!(f.store.records().await[0].interval_seconds, None);
        assert_eq!(f.logger.status().await.log_count, 0);
    }
}
