//! Sensor identifiers and the per-family admission rules.
//!
//! Every reading pushed by a field device is checked here before it may
//! enter the realtime cache. The rules are a table indexed by family so the
//! four families share one code path.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::models::{AcceptedReading, RejectReason, RejectedReading, SensorFamily, ValveStatus};

/// Identifier grammar, legal value range and storage unit of one family.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyRule {
    pub family: SensorFamily,
    /// Case-sensitive identifier prefix
    pub prefix: &'static str,
    /// Highest legal index; the lowest is always 1
    pub max_index: u8,
    /// Inclusive value bounds, `None` when any finite value is legal
    pub range: Option<(f64, f64)>,
    pub unit: &'static str,
}

impl FamilyRule {
    pub fn check_range(&self, value: f64) -> Result<f64, RejectReason> {
        match self.range {
            Some((min, max)) if value < min || value > max => Err(RejectReason::OutOfRange),
            _ => Ok(value),
        }
    }
}

// Indexed by the `SensorFamily` discriminant.
static RULES: [FamilyRule; 4] = [
    FamilyRule {
        family: SensorFamily::Temperature,
        prefix: "T",
        max_index: 15,
        range: Some((-40.0, 80.0)),
        unit: "°C",
    },
    FamilyRule {
        family: SensorFamily::Humidity,
        prefix: "RH",
        max_index: 7,
        range: Some((0.0, 100.0)),
        unit: "%",
    },
    FamilyRule {
        family: SensorFamily::WaterLevel,
        prefix: "WL",
        max_index: 9,
        range: Some((0.0, 100.0)),
        unit: "%",
    },
    FamilyRule {
        family: SensorFamily::WaterWeight,
        prefix: "WW",
        max_index: 9,
        range: None,
        unit: "g",
    },
];

/// Last temperature probe mounted in air; higher indices sit in water.
const LAST_AIR_PROBE: u8 = 7;

impl SensorFamily {
    pub fn rule(self) -> &'static FamilyRule {
        &RULES[self as usize]
    }

    pub fn unit(self) -> &'static str {
        self.rule().unit
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemperatureZone {
    Air,
    Water,
}

/// A validated sensor identifier such as `T5` or `RH1`.
///
/// Ordering follows family, then numeric index, so `T2` sorts before `T10`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SensorId {
    family: SensorFamily,
    index: u8,
}

impl SensorId {
    pub fn new(family: SensorFamily, index: u8) -> Option<Self> {
        (1..=family.rule().max_index)
            .contains(&index)
            .then_some(Self { family, index })
    }

    /// Parses `raw` against the identifier grammar of `family`.
    ///
    /// The index must be plain decimal with no sign and no leading zero.
    pub fn parse(family: SensorFamily, raw: &str) -> Result<Self, RejectReason> {
        let digits = raw
            .strip_prefix(family.rule().prefix)
            .ok_or(RejectReason::BadIdentifierFormat)?;

        if digits.is_empty()
            || digits.starts_with('0')
            || !digits.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(RejectReason::BadIdentifierFormat);
        }

        digits
            .parse::<u8>()
            .ok()
            .and_then(|index| Self::new(family, index))
            .ok_or(RejectReason::BadIdentifierFormat)
    }

    /// Every identifier the family can legally report.
    pub fn all(family: SensorFamily) -> impl Iterator<Item = SensorId> {
        (1..=family.rule().max_index).map(move |index| SensorId { family, index })
    }

    pub fn family(&self) -> SensorFamily {
        self.family
    }

    pub fn index(&self) -> u8 {
        self.index
    }

    /// Mounting zone of a temperature probe, `None` for other families.
    pub fn zone(&self) -> Option<TemperatureZone> {
        match self.family {
            SensorFamily::Temperature if self.index <= LAST_AIR_PROBE => Some(TemperatureZone::Air),
            SensorFamily::Temperature => Some(TemperatureZone::Water),
            _ => None,
        }
    }
}

impl fmt::Display for SensorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.family.rule().prefix, self.index)
    }
}

impl Serialize for SensorId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Checks that `value` is a finite number inside the family range.
pub fn validate_value(family: SensorFamily, value: &Value) -> Result<f64, RejectReason> {
    let number = value
        .as_f64()
        .filter(|v| v.is_finite())
        .ok_or(RejectReason::NonNumericValue)?;

    family.rule().check_range(number)
}

#[derive(Debug, Clone, Default)]
pub struct BatchPartition {
    pub accepted: Vec<AcceptedReading>,
    pub rejected: Vec<RejectedReading>,
}

/// Splits a `{identifier: value}` batch into accepted and rejected entries.
///
/// A bad entry never prevents its siblings from being accepted.
pub fn partition_batch(family: SensorFamily, entries: &Map<String, Value>) -> BatchPartition {
    let mut partition = BatchPartition::default();

    for (raw_id, raw_value) in entries {
        let outcome = SensorId::parse(family, raw_id)
            .and_then(|sensor_id| Ok((sensor_id, validate_value(family, raw_value)?)));

        match outcome {
            Ok((sensor_id, value)) => partition.accepted.push(AcceptedReading { sensor_id, value }),
            Err(reason) => partition.rejected.push(RejectedReading {
                sensor_id: raw_id.clone(),
                value: matches!(reason, RejectReason::OutOfRange).then(|| raw_value.clone()),
                reason,
            }),
        }
    }

    partition
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValveRejection {
    InvalidStatus,
    InvalidLevel,
}

impl fmt::Display for ValveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValveRejection::InvalidStatus => f.write_str("Invalid valve status, expected \"open\" or \"closed\""),
            ValveRejection::InvalidLevel => f.write_str("Invalid valve level, expected a number"),
        }
    }
}

impl std::error::Error for ValveRejection {}

/// Validated valve report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValveReport {
    pub status: ValveStatus,
    pub level: f64,
}

/// Validates a `{"status": "open" | "closed", "level": n}` payload.
///
/// `level` may be omitted or null, in which case it reads as 0.
pub fn parse_valve(payload: &Value) -> Result<ValveReport, ValveRejection> {
    let status = match payload.get("status").and_then(Value::as_str) {
        Some("open") => ValveStatus::Open,
        Some("closed") => ValveStatus::Closed,
        _ => return Err(ValveRejection::InvalidStatus),
    };

    let level = match payload.get("level") {
        None | Some(Value::Null) => 0.0,
        Some(level) => level
            .as_f64()
            .filter(|v| v.is_finite())
            .ok_or(ValveRejection::InvalidLevel)?,
    };

    Ok(ValveReport { status, level })
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn id(family: SensorFamily, raw: &str) -> Result<SensorId, RejectReason> {
        SensorId::parse(family, raw)
    }

    #[test]
    fn test_parse_identifier_bounds() {
        assert_eq!(id(SensorFamily::Temperature, "T1").unwrap().index(), 1);
        assert_eq!(id(SensorFamily::Temperature, "T15").unwrap().index(), 15);
        assert_eq!(id(SensorFamily::Humidity, "RH7").unwrap().index(), 7);
        assert_eq!(id(SensorFamily::WaterLevel, "WL9").unwrap().index(), 9);
        assert_eq!(id(SensorFamily::WaterWeight, "WW1").unwrap().index(), 1);

        for (family, raw) in [
            (SensorFamily::Temperature, "T0"),
            (SensorFamily::Temperature, "T16"),
            (SensorFamily::Temperature, "T01"),
            (SensorFamily::Temperature, "t1"),
            (SensorFamily::Temperature, "T"),
            (SensorFamily::Temperature, "T+1"),
            (SensorFamily::Temperature, "T1 "),
            (SensorFamily::Temperature, "T300"),
            (SensorFamily::Humidity, "RH8"),
            (SensorFamily::Humidity, "T1"),
            (SensorFamily::WaterLevel, "WL10"),
            (SensorFamily::WaterWeight, "WL1"),
        ] {
            assert_eq!(id(family, raw), Err(RejectReason::BadIdentifierFormat), "{raw}");
        }
    }

    #[test]
    fn test_identifier_display_and_order() {
        let t2 = id(SensorFamily::Temperature, "T2").unwrap();
        let t10 = id(SensorFamily::Temperature, "T10").unwrap();

        assert_eq!(t10.to_string(), "T10");
        assert!(t2 < t10);
        assert_eq!(serde_json::to_value(t10).unwrap(), json!("T10"));
    }

    #[test]
    fn test_temperature_zone() {
        assert_eq!(id(SensorFamily::Temperature, "T7").unwrap().zone(), Some(TemperatureZone::Air));
        assert_eq!(id(SensorFamily::Temperature, "T8").unwrap().zone(), Some(TemperatureZone::Water));
        assert_eq!(id(SensorFamily::Humidity, "RH1").unwrap().zone(), None);
    }

    #[test]
    fn test_all_identifiers_of_family() {
        let ids: Vec<String> = SensorId::all(SensorFamily::Humidity).map(|id| id.to_string()).collect();
        assert_eq!(ids, ["RH1", "RH2", "RH3", "RH4", "RH5", "RH6", "RH7"]);
        assert_eq!(SensorId::all(SensorFamily::Temperature).count(), 15);
    }

    #[test]
    fn test_validate_value_ranges() {
        assert_eq!(validate_value(SensorFamily::Temperature, &json!(-40)), Ok(-40.0));
        assert_eq!(validate_value(SensorFamily::Temperature, &json!(80.0)), Ok(80.0));
        assert_eq!(validate_value(SensorFamily::Temperature, &json!(80.1)), Err(RejectReason::OutOfRange));
        assert_eq!(validate_value(SensorFamily::Humidity, &json!(-0.5)), Err(RejectReason::OutOfRange));
        assert_eq!(validate_value(SensorFamily::WaterLevel, &json!(100)), Ok(100.0));
        assert_eq!(validate_value(SensorFamily::WaterWeight, &json!(-12345.5)), Ok(-12345.5));
        assert_eq!(validate_value(SensorFamily::WaterWeight, &json!(1.0e9)), Ok(1.0e9));
    }

    #[test]
    fn test_validate_value_rejects_non_numbers() {
        for value in [json!("25"), json!(null), json!(true), json!([1]), json!({"v": 1})] {
            assert_eq!(
                validate_value(SensorFamily::Humidity, &value),
                Err(RejectReason::NonNumericValue),
                "{value}"
            );
        }
    }

    #[test]
    fn test_partition_batch_is_partial_success() {
        let batch = json!({
            "T1": 25.5,
            "T16": 999,
            "T2": "hot",
            "T3": 120,
            "T4": -3.25
        });

        let partition = partition_batch(SensorFamily::Temperature, batch.as_object().unwrap());

        let accepted: Vec<(String, f64)> = partition
            .accepted
            .iter()
            .map(|r| (r.sensor_id.to_string(), r.value))
            .collect();
        assert_eq!(accepted, [("T1".to_string(), 25.5), ("T4".to_string(), -3.25)]);

        assert_eq!(partition.rejected.len(), 3);
        let reason_of = |sensor: &str| {
            partition
                .rejected
                .iter()
                .find(|r| r.sensor_id == sensor)
                .map(|r| r.reason)
        };
        assert_eq!(reason_of("T16"), Some(RejectReason::BadIdentifierFormat));
        assert_eq!(reason_of("T2"), Some(RejectReason::NonNumericValue));
        assert_eq!(reason_of("T3"), Some(RejectReason::OutOfRange));
    }

    #[test]
    fn test_identifier_is_checked_before_value() {
        let batch = json!({ "T99": "not a number" });
        let partition = partition_batch(SensorFamily::Temperature, batch.as_object().unwrap());

        assert_eq!(partition.rejected[0].reason, RejectReason::BadIdentifierFormat);
        assert!(partition.rejected[0].value.is_none());
    }

    #[test]
    fn test_parse_valve() {
        assert_eq!(
            parse_valve(&json!({"status": "open", "level": 15.5})),
            Ok(ValveReport { status: ValveStatus::Open, level: 15.5 })
        );
        assert_eq!(
            parse_valve(&json!({"status": "closed"})),
            Ok(ValveReport { status: ValveStatus::Closed, level: 0.0 })
        );
        assert_eq!(
            parse_valve(&json!({"status": "closed", "level": null})),
            Ok(ValveReport { status: ValveStatus::Closed, level: 0.0 })
        );

        assert_eq!(parse_valve(&json!({"status": "bogus"})), Err(ValveRejection::InvalidStatus));
        assert_eq!(parse_valve(&json!({"status": "OPEN"})), Err(ValveRejection::InvalidStatus));
        assert_eq!(parse_valve(&json!({"level": 3})), Err(ValveRejection::InvalidStatus));
        assert_eq!(parse_valve(&json!([])), Err(ValveRejection::InvalidStatus));
        assert_eq!(
            parse_valve(&json!({"status": "open", "level": "high"})),
            Err(ValveRejection::InvalidLevel)
        );
    }
}
