use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeDelta};

/// One physiological sample pulled out of a health export.
///
/// `time` keeps the offset the export recorded, so `local_time` is the wall
/// clock of the person wearing the device.
#[derive(Clone, Debug, PartialEq)]
pub struct Observation {
    pub time: DateTime<FixedOffset>,
    pub kind: ObservationKind,
    pub value: ObservationValue,
    pub source: Option<String>,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ObservationKind {
    HeartRate,
    Hrv,
    RespiratoryRate,
    OxygenSaturation,
    SleepStage,
    Movement,
    SoundLevel,
}

#[derive(Clone, Debug, PartialEq)]
pub enum ObservationValue {
    /// Numeric sample already coerced to the kind's standard unit.
    Quantity(f64),
    Stage(SleepStageInterval),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SleepStage {
    InBed,
    Awake,
    /// Asleep, but the device did not report a stage.
    Unspecified,
    Core,
    Deep,
    Rem,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SleepStageInterval {
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub stage: SleepStage,
}

impl SleepStage {
    pub fn is_asleep(self) -> bool {
        matches!(self, Self::Unspecified | Self::Core | Self::Deep | Self::Rem)
    }

    /// True for stages that only devices with stage tracking report.
    pub fn is_staged(self) -> bool {
        matches!(self, Self::Core | Self::Deep | Self::Rem)
    }
}

impl SleepStageInterval {
    pub fn duration(&self) -> TimeDelta {
        self.end - self.start
    }
}

impl Observation {
    pub fn quantity(
        time: DateTime<FixedOffset>,
        kind: ObservationKind,
        value: f64,
        source: Option<String>,
    ) -> Self {
        Self {
            time,
            kind,
            value: ObservationValue::Quantity(value),
            source,
        }
    }

    pub fn stage(interval: SleepStageInterval, source: Option<String>) -> Self {
        Self {
            time: interval.start,
            kind: ObservationKind::SleepStage,
            value: ObservationValue::Stage(interval),
            source,
        }
    }

    pub fn local_time(&self) -> NaiveDateTime {
        self.time.naive_local()
    }

    pub fn as_quantity(&self) -> Option<f64> {
        match self.value {
            ObservationValue::Quantity(value) => Some(value),
            ObservationValue::Stage(_) => None,
        }
    }

    pub fn as_interval(&self) -> Option<&SleepStageInterval> {
        match &self.value {
            ObservationValue::Stage(interval) => Some(interval),
            ObservationValue::Quantity(_) => None,
        }
    }
}
