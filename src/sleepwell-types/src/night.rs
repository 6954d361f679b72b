use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::ObservationKind;

/// Aggregate of one sleep night, anchored to the date the person went to bed.
///
/// Every metric is `None` when the export had nothing to measure it with.
/// Absent metrics serialize as `null`, never as `0`.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NightRecord {
    pub date: NaiveDate,
    pub total_sleep_hours: Option<f64>,
    pub rem_hours: Option<f64>,
    pub non_rem_hours: Option<f64>,
    pub avg_hr: Option<f64>,
    pub avg_hrv: Option<f64>,
    pub avg_resp: Option<f64>,
    /// `rem_hours / total_sleep_hours`, as a fraction.
    pub rem_percentage: Option<f64>,
    pub deep_hours: Option<f64>,
    pub awake_hours: Option<f64>,
    pub in_bed_hours: Option<f64>,
    pub avg_spo2: Option<f64>,
    pub avg_sound_level: Option<f64>,
    pub avg_movement: Option<f64>,
    pub bed_time: Option<NaiveDateTime>,
    pub wake_time: Option<NaiveDateTime>,
    pub metrics_present: BTreeSet<ObservationKind>,
}

impl NightRecord {
    pub fn has(&self, kind: ObservationKind) -> bool {
        self.metrics_present.contains(&kind)
    }
}
