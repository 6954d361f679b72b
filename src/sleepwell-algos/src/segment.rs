use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use sleepwell_types::{Observation, ObservationKind};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SegmenterConfig {
    /// Local time from which observations belong to the night starting that
    /// day. Anything earlier continues the previous night.
    pub evening_cutoff: NaiveTime,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            evening_cutoff: NaiveTime::from_hms_opt(18, 0, 0).unwrap_or_default(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct NightSegmenter {
    config: SegmenterConfig,
}

impl NightSegmenter {
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// Date of the night a local timestamp belongs to: the bed-time date.
    pub fn night_anchor(&self, time: NaiveDateTime) -> NaiveDate {
        if time.time() >= self.config.evening_cutoff {
            time.date()
        } else {
            time.date() - TimeDelta::days(1)
        }
    }

    /// Buckets observations by night. Nights without a single sleep-analysis
    /// observation are dropped, whatever else was recorded during them.
    pub fn segment(&self, observations: Vec<Observation>) -> BTreeMap<NaiveDate, Vec<Observation>> {
        let mut nights: BTreeMap<NaiveDate, Vec<Observation>> = BTreeMap::new();
        for observation in observations {
            let anchor = self.night_anchor(observation.local_time());
            nights.entry(anchor).or_default().push(observation);
        }

        let total = nights.len();
        nights.retain(|_, observations| {
            observations
                .iter()
                .any(|o| o.kind == ObservationKind::SleepStage)
        });
        if total > nights.len() {
            debug!("dropped {} buckets without sleep data", total - nights.len());
        }

        nights
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, FixedOffset, TimeZone};
    use sleepwell_types::{SleepStage, SleepStageInterval};

    use super::*;

    fn at(day: u32, h: u32, m: u32) -> DateTime<FixedOffset> {
        FixedOffset::west_opt(5 * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 1, day, h, m, 0)
            .unwrap()
    }

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, day).unwrap()
    }

    fn hr(time: DateTime<FixedOffset>) -> Observation {
        Observation::quantity(time, ObservationKind::HeartRate, 60.0, None)
    }

    fn sleep(start: DateTime<FixedOffset>, end: DateTime<FixedOffset>) -> Observation {
        Observation::stage(
            SleepStageInterval {
                start,
                end,
                stage: SleepStage::Unspecified,
            },
            None,
        )
    }

    #[test]
    fn cutoff_splits_same_calendar_day() {
        let segmenter = NightSegmenter::default();
        let before = at(2, 17, 59).naive_local();
        let after = at(2, 18, 1).naive_local();

        assert_eq!(segmenter.night_anchor(before), date(1));
        assert_eq!(segmenter.night_anchor(after), date(2));
        assert_ne!(segmenter.night_anchor(before), segmenter.night_anchor(after));
    }

    #[test]
    fn cutoff_is_inclusive() {
        let segmenter = NightSegmenter::default();
        assert_eq!(segmenter.night_anchor(at(2, 18, 0).naive_local()), date(2));
    }

    #[test]
    fn early_morning_continues_previous_night() {
        let nights = NightSegmenter::default().segment(vec![
            sleep(at(1, 22, 0), at(2, 6, 0)),
            hr(at(1, 23, 0)),
            hr(at(2, 3, 0)),
        ]);

        assert_eq!(nights.len(), 1);
        assert_eq!(nights[&date(1)].len(), 3);
    }

    #[test]
    fn uses_recorded_offset_not_utc() {
        // 01:00 local at -0500 is 06:00 UTC; still the night of the 1st
        let nights = NightSegmenter::default().segment(vec![sleep(at(2, 1, 0), at(2, 5, 0))]);
        assert!(nights.contains_key(&date(1)));
    }

    #[test]
    fn buckets_without_sleep_are_dropped() {
        let nights = NightSegmenter::default().segment(vec![
            sleep(at(1, 22, 0), at(2, 6, 0)),
            hr(at(2, 20, 0)),
            hr(at(3, 2, 0)),
        ]);

        assert_eq!(nights.keys().copied().collect::<Vec<_>>(), vec![date(1)]);
    }

    #[test]
    fn custom_cutoff() {
        let segmenter = NightSegmenter::new(SegmenterConfig {
            evening_cutoff: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        });
        assert_eq!(segmenter.night_anchor(at(2, 13, 0).naive_local()), date(2));
        assert_eq!(segmenter.night_anchor(at(2, 11, 0).naive_local()), date(1));
    }
}
