use quick_xml::events::BytesStart;
use sleepwell_types::{Observation, ObservationKind, SleepStage, SleepStageInterval};

use crate::parse_apple_date;

/// Attributes of one `<Record>` element, before any interpretation.
#[derive(Debug, Default, PartialEq)]
pub(crate) struct RawRecord {
    pub record_type: String,
    pub unit: Option<String>,
    pub value: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub source: Option<String>,
}

/// Why a record did not become an observation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum Skip {
    UnknownType,
    InvalidAttribute,
    InvalidDate,
    InvalidValue,
    InvalidUnit,
    InvalidInterval,
}

enum RecordType {
    Quantity(ObservationKind),
    SleepAnalysis,
}

impl RecordType {
    fn from_identifier(identifier: &str) -> Option<Self> {
        let kind = match identifier {
            "HKQuantityTypeIdentifierHeartRate" => ObservationKind::HeartRate,
            "HKQuantityTypeIdentifierHeartRateVariabilitySDNN" => ObservationKind::Hrv,
            "HKQuantityTypeIdentifierRespiratoryRate" => ObservationKind::RespiratoryRate,
            "HKQuantityTypeIdentifierOxygenSaturation" => ObservationKind::OxygenSaturation,
            "HKQuantityTypeIdentifierEnvironmentalAudioExposure"
            | "HKQuantityTypeIdentifierHeadphoneAudioExposure" => ObservationKind::SoundLevel,
            "HKQuantityTypeIdentifierStepCount" => ObservationKind::Movement,
            "HKCategoryTypeIdentifierSleepAnalysis" => return Some(Self::SleepAnalysis),
            _ => return None,
        };
        Some(Self::Quantity(kind))
    }
}

impl RawRecord {
    pub fn from_element(element: &BytesStart<'_>) -> Result<Self, Skip> {
        let mut record = RawRecord::default();
        for attr in element.attributes() {
            let attr = attr.map_err(|_| Skip::InvalidAttribute)?;
            let value = attr
                .unescape_value()
                .map_err(|_| Skip::InvalidAttribute)?
                .into_owned();

            match attr.key.as_ref() {
                b"type" => record.record_type = value,
                b"unit" => record.unit = Some(value),
                b"value" => record.value = Some(value),
                b"startDate" => record.start = Some(value),
                b"endDate" => record.end = Some(value),
                b"sourceName" => record.source = Some(value),
                _ => {}
            }
        }
        Ok(record)
    }

    pub fn into_observation(self) -> Result<Observation, Skip> {
        let record_type = RecordType::from_identifier(&self.record_type).ok_or(Skip::UnknownType)?;
        let start = self
            .start
            .as_deref()
            .and_then(parse_apple_date)
            .ok_or(Skip::InvalidDate)?;

        match record_type {
            RecordType::Quantity(kind) => {
                let value = self
                    .value
                    .as_deref()
                    .and_then(|v| v.trim().parse::<f64>().ok())
                    .filter(|v| v.is_finite() && *v >= 0.0)
                    .ok_or(Skip::InvalidValue)?;
                let value = coerce_unit(kind, self.unit.as_deref(), value).ok_or(Skip::InvalidUnit)?;
                Ok(Observation::quantity(start, kind, value, self.source))
            }
            RecordType::SleepAnalysis => {
                let end = self
                    .end
                    .as_deref()
                    .and_then(parse_apple_date)
                    .ok_or(Skip::InvalidDate)?;
                if end <= start {
                    return Err(Skip::InvalidInterval);
                }

                let interval = SleepStageInterval {
                    start,
                    end,
                    stage: sleep_stage(self.value.as_deref()),
                };
                Ok(Observation::stage(interval, self.source))
            }
        }
    }
}

/// Converts a sample to the kind's standard unit: bpm, ms, breaths/min,
/// percent, dB SPL and step count. Unknown units yield `None`.
fn coerce_unit(kind: ObservationKind, unit: Option<&str>, value: f64) -> Option<f64> {
    let unit = unit.map(str::trim).unwrap_or_default();
    match (kind, unit) {
        (ObservationKind::HeartRate, "count/min" | "bpm") => Some(value),
        (ObservationKind::HeartRate, "count/s" | "Hz") => Some(value * 60.0),
        (ObservationKind::Hrv, "ms") => Some(value),
        (ObservationKind::Hrv, "s") => Some(value * 1000.0),
        (ObservationKind::RespiratoryRate, "count/min") => Some(value),
        (ObservationKind::OxygenSaturation, "%") if value <= 1.0 => Some(value * 100.0),
        (ObservationKind::OxygenSaturation, "%") if value <= 100.0 => Some(value),
        (ObservationKind::SoundLevel, "dBASPL") => Some(value),
        (ObservationKind::Movement, "count") => Some(value),
        _ => None,
    }
}

/// Maps both the symbolic category values and the legacy numeric codes.
/// Anything unrecognised is treated as unstaged sleep.
fn sleep_stage(value: Option<&str>) -> SleepStage {
    let value = value.map(str::trim).unwrap_or_default();
    let value = value
        .strip_prefix("HKCategoryValueSleepAnalysis")
        .unwrap_or(value);

    match value {
        "InBed" | "0" => SleepStage::InBed,
        "Asleep" | "AsleepUnspecified" | "1" => SleepStage::Unspecified,
        "Awake" | "2" => SleepStage::Awake,
        "AsleepCore" | "3" => SleepStage::Core,
        "AsleepDeep" | "4" => SleepStage::Deep,
        "AsleepREM" | "5" => SleepStage::Rem,
        _ => SleepStage::Unspecified,
    }
}
