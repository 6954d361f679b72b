use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, FixedOffset, NaiveDate};
use sleepwell_types::{NightRecord, Observation, ObservationKind, SleepStage, SleepStageInterval};

use crate::helpers::time_math::mean;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Only average samples taken between bed time and wake time.
    pub sleep_window_only: bool,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            sleep_window_only: true,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NightAggregator {
    config: AggregatorConfig,
}

type Span = (DateTime<FixedOffset>, DateTime<FixedOffset>);

impl NightAggregator {
    pub fn new(config: AggregatorConfig) -> Self {
        Self { config }
    }

    pub fn aggregate(&self, date: NaiveDate, observations: &[Observation]) -> NightRecord {
        let intervals = Self::unique_intervals(observations);
        let hours_in = |stages: &[SleepStage]| {
            let spans = intervals
                .iter()
                .filter(|i| stages.contains(&i.stage))
                .map(|i| (i.start, i.end));
            union_hours(spans)
        };

        let asleep = hours_in(&[
            SleepStage::Unspecified,
            SleepStage::Core,
            SleepStage::Deep,
            SleepStage::Rem,
        ]);
        let in_bed = hours_in(&[SleepStage::InBed]);
        let awake = hours_in(&[SleepStage::Awake]);
        let rem = hours_in(&[SleepStage::Rem]);
        let deep = hours_in(&[SleepStage::Deep]);

        let staged = intervals.iter().any(|i| i.stage.is_staged());
        let total_sleep_hours = asleep.or(in_bed);
        let rem_hours = if staged { Some(rem.unwrap_or(0.0)) } else { None };
        let deep_hours = if staged { Some(deep.unwrap_or(0.0)) } else { None };
        let non_rem_hours = rem_hours
            .zip(total_sleep_hours)
            .map(|(rem, total)| (total - rem).max(0.0));

        let window = intervals
            .iter()
            .map(|i| i.start)
            .min()
            .zip(intervals.iter().map(|i| i.end).max());

        let average = |kind: ObservationKind| {
            let values = observations
                .iter()
                .filter(|o| o.kind == kind)
                .filter(|o| match (self.config.sleep_window_only, window) {
                    (true, Some((bed, wake))) => o.time >= bed && o.time <= wake,
                    _ => true,
                })
                .filter_map(Observation::as_quantity)
                .filter(|v| v.is_finite())
                .collect::<Vec<_>>();
            mean(&values)
        };

        let mut record = NightRecord {
            date,
            total_sleep_hours,
            rem_hours,
            non_rem_hours,
            avg_hr: average(ObservationKind::HeartRate),
            avg_hrv: average(ObservationKind::Hrv),
            avg_resp: average(ObservationKind::RespiratoryRate),
            rem_percentage: rem_percentage(rem_hours, total_sleep_hours),
            deep_hours,
            awake_hours: awake,
            in_bed_hours: in_bed,
            avg_spo2: average(ObservationKind::OxygenSaturation),
            avg_sound_level: average(ObservationKind::SoundLevel),
            avg_movement: average(ObservationKind::Movement),
            bed_time: window.map(|(bed, _)| bed.naive_local()),
            wake_time: window.map(|(_, wake)| wake.naive_local()),
            metrics_present: BTreeSet::new(),
        };
        record.metrics_present = Self::present(&record, !intervals.is_empty());
        record
    }

    /// Sleep intervals with exact duplicates from the same source removed.
    fn unique_intervals(observations: &[Observation]) -> Vec<SleepStageInterval> {
        let mut seen = HashSet::new();
        observations
            .iter()
            .filter_map(|o| o.as_interval().map(|i| (o.source.as_deref(), i)))
            .filter(|(source, i)| seen.insert((*source, i.start, i.end, i.stage)))
            .map(|(_, i)| *i)
            .collect()
    }

    fn present(record: &NightRecord, has_sleep: bool) -> BTreeSet<ObservationKind> {
        [
            (ObservationKind::SleepStage, has_sleep),
            (ObservationKind::HeartRate, record.avg_hr.is_some()),
            (ObservationKind::Hrv, record.avg_hrv.is_some()),
            (ObservationKind::RespiratoryRate, record.avg_resp.is_some()),
            (ObservationKind::OxygenSaturation, record.avg_spo2.is_some()),
            (ObservationKind::SoundLevel, record.avg_sound_level.is_some()),
            (ObservationKind::Movement, record.avg_movement.is_some()),
        ]
        .into_iter()
        .filter_map(|(kind, present)| present.then_some(kind))
        .collect()
    }
}

/// `rem / total`, undefined when either is missing or the night has no sleep.
pub fn rem_percentage(rem_hours: Option<f64>, total_sleep_hours: Option<f64>) -> Option<f64> {
    match (rem_hours, total_sleep_hours) {
        (Some(rem), Some(total)) if total > 0.0 => Some(rem / total),
        _ => None,
    }
}

/// Length of the union of the spans in hours, so overlapping recordings from
/// several devices count once. `None` when there are no spans.
fn union_hours(spans: impl Iterator<Item = Span>) -> Option<f64> {
    let mut spans = spans.collect::<Vec<_>>();
    if spans.is_empty() {
        return None;
    }
    spans.sort();

    let mut total_seconds = 0_i64;
    let (mut start, mut end) = spans[0];
    for &(next_start, next_end) in &spans[1..] {
        if next_start <= end {
            end = end.max(next_end);
        } else {
            total_seconds += (end - start).num_seconds();
            (start, end) = (next_start, next_end);
        }
    }
    total_seconds += (end - start).num_seconds();

    Some(total_seconds as f64 / 3600.0)
}
