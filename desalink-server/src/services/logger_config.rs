use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

use desalink_api::SensorId;
use desalink_api::models::{LoggerConfigRequest, SelectionInput, SensorFamily};

use crate::errors::LoggerError;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(5);

/// Longest accepted sampling interval, one day.
pub const MAX_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Which sensors of one family the logger samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection {
    All,
    None,
    Sensor(SensorId),
}

impl Selection {
    pub fn from_input(family: SensorFamily, input: &SelectionInput) -> Result<Self, LoggerError> {
        match input {
            SelectionInput::Flag(true) => Ok(Selection::All),
            SelectionInput::Flag(false) => Ok(Selection::None),
            SelectionInput::Name(name) => match name.as_str() {
                "all" => Ok(Selection::All),
                "none" => Ok(Selection::None),
                raw => SensorId::parse(family, raw)
                    .map(Selection::Sensor)
                    .map_err(|_| LoggerError::InvalidSelection {
                        family,
                        value: raw.to_string(),
                    }),
            },
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, Selection::None)
    }

    /// Sensors visited on each cycle, in index order.
    pub fn sensors(&self, family: SensorFamily) -> Vec<SensorId> {
        match self {
            Selection::All => SensorId::all(family).collect(),
            Selection::None => Vec::new(),
            Selection::Sensor(sensor_id) => vec![*sensor_id],
        }
    }
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all"),
            Selection::None => f.write_str("none"),
            Selection::Sensor(sensor_id) => write!(f, "{sensor_id}"),
        }
    }
}

/// Interval and per-family selection read by every logging cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggerConfiguration {
    interval: Duration,
    selections: BTreeMap<SensorFamily, Selection>,
}

impl Default for LoggerConfiguration {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
            selections: SensorFamily::PERSISTABLE
                .into_iter()
                .map(|family| (family, Selection::All))
                .collect(),
        }
    }
}

impl LoggerConfiguration {
    pub fn with_interval(interval_ms: u64) -> Result<Self, LoggerError> {
        let mut configuration = Self::default();
        configuration.set_interval(interval_ms)?;
        Ok(configuration)
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn interval_ms(&self) -> u64 {
        self.interval.as_millis() as u64
    }

    /// Interval in whole seconds, as stamped on persisted records.
    pub fn interval_seconds(&self) -> u32 {
        u32::try_from(self.interval.as_secs()).unwrap_or(u32::MAX)
    }

    pub fn set_interval(&mut self, interval_ms: u64) -> Result<(), LoggerError> {
        self.interval = checked_interval(interval_ms)?;
        Ok(())
    }

    pub fn select(&mut self, family: SensorFamily, input: &SelectionInput) -> Result<(), LoggerError> {
        let selection = checked_selection(family, input)?;
        self.selections.insert(family, selection);
        Ok(())
    }

    /// Current selection; realtime-only families always read as `None`.
    pub fn selection(&self, family: SensorFamily) -> Selection {
        self.selections
            .get(&family)
            .copied()
            .unwrap_or(Selection::None)
    }

    pub fn sensors_for(&self, family: SensorFamily) -> Vec<SensorId> {
        self.selection(family).sensors(family)
    }

    /// Applies a client request atomically: nothing changes unless every field is valid.
    ///
    /// Returns the new interval when the request changed it.
    pub fn apply(&mut self, request: &LoggerConfigRequest) -> Result<Option<Duration>, LoggerError> {
        if request.is_empty() {
            return Err(LoggerError::EmptyConfiguration);
        }

        let interval = request.interval.map(checked_interval).transpose()?;
        let selections = request
            .selections()
            .map(|(family, input)| checked_selection(family, input).map(|selection| (family, selection)))
            .collect::<Result<Vec<_>, LoggerError>>()?;

        if let Some(interval) = interval {
            self.interval = interval;
        }
        self.selections.extend(selections);

        Ok(interval)
    }
}

fn checked_interval(interval_ms: u64) -> Result<Duration, LoggerError> {
    let interval = Duration::from_millis(interval_ms);

    if interval.is_zero() || interval > MAX_INTERVAL {
        return Err(LoggerError::InvalidInterval);
    }

    Ok(interval)
}

fn checked_selection(family: SensorFamily, input: &SelectionInput) -> Result<Selection, LoggerError> {
    if !family.is_persistable() {
        return Err(LoggerError::NotPersistable(family));
    }

    Selection::from_input(family, input)
}
