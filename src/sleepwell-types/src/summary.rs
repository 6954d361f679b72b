use chrono::{NaiveDate, NaiveTime};

/// Cross-night aggregate. Each average only counts nights where its metric
/// exists, so `samples` can differ per field.
///
/// An empty night set yields `nights_tracked == 0` with every field `None`,
/// which is distinguishable from a set of nights that averaged to zero.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub nights_tracked: usize,
    pub avg_total_sleep: Option<f64>,
    pub avg_hr: Option<f64>,
    pub avg_hrv: Option<f64>,
    pub avg_resp_rate: Option<f64>,
    pub avg_rem_pct: Option<f64>,
    pub total_sleep_hours: Option<f64>,
    pub first_night: Option<NaiveDate>,
    pub last_night: Option<NaiveDate>,
    pub mean_bed_time: Option<NaiveTime>,
    pub mean_wake_time: Option<NaiveTime>,
    pub bed_time_std_minutes: Option<f64>,
    pub wake_time_std_minutes: Option<f64>,
    pub samples: MetricSamples,
    pub trends: Trends,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricSamples {
    pub total_sleep: usize,
    pub hr: usize,
    pub hrv: usize,
    pub resp_rate: usize,
    pub rem_pct: usize,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trends {
    pub sleep_duration: Option<Trend>,
    pub heart_rate: Option<Trend>,
    pub hrv: Option<Trend>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, strum::Display)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum Trend {
    Improving,
    Declining,
    Stable,
}

impl Summary {
    pub fn is_empty(&self) -> bool {
        self.nights_tracked == 0
    }
}
