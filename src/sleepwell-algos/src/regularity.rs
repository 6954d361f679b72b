use std::fmt::{self, Display};

use chrono::NaiveTime;
use sleepwell_types::NightRecord;

use crate::helpers::time_math::{mean_time, round_float, std_time_minutes};

/// Fewest nights for which a spread of bed and wake times means anything.
pub const MIN_REGULARITY_NIGHTS: usize = 2;

/// Bed and wake time consistency across nights.
#[derive(Default)]
pub struct RegularityAnalyzer {
    bed_times: Vec<NaiveTime>,
    wake_times: Vec<NaiveTime>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RegularityMetrics {
    pub mean_bed_time: Option<NaiveTime>,
    pub mean_wake_time: Option<NaiveTime>,
    pub bed_time_std_minutes: Option<f64>,
    pub wake_time_std_minutes: Option<f64>,
}

impl RegularityAnalyzer {
    pub fn new(nights: &[NightRecord]) -> Self {
        let mut analyzer = RegularityAnalyzer::default();
        for night in nights {
            if let Some(bed) = night.bed_time {
                analyzer.bed_times.push(bed.time());
            }
            if let Some(wake) = night.wake_time {
                analyzer.wake_times.push(wake.time());
            }
        }
        analyzer
    }

    pub fn metrics(&self) -> RegularityMetrics {
        let spread = |times: &[NaiveTime]| {
            if times.len() < MIN_REGULARITY_NIGHTS {
                return None;
            }
            std_time_minutes(times).map(round_float)
        };

        RegularityMetrics {
            mean_bed_time: mean_time(&self.bed_times),
            mean_wake_time: mean_time(&self.wake_times),
            bed_time_std_minutes: spread(&self.bed_times),
            wake_time_std_minutes: spread(&self.wake_times),
        }
    }
}

impl RegularityMetrics {
    /// Single variance figure for scoring: the mean of whichever of the bed
    /// and wake spreads are known.
    pub fn combined_minutes(&self) -> Option<f64> {
        match (self.bed_time_std_minutes, self.wake_time_std_minutes) {
            (Some(bed), Some(wake)) => Some((bed + wake) / 2.0),
            (bed, wake) => bed.or(wake),
        }
    }
}

impl Display for RegularityMetrics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let time = |t: Option<NaiveTime>| t.map_or_else(|| "-".to_string(), |t| t.format("%H:%M").to_string());
        let minutes = |m: Option<f64>| m.map_or_else(|| "-".to_string(), |m| format!("{m} min"));

        write!(
            f,
            "Bed time: {} (std {})\nWake time: {} (std {})",
            time(self.mean_bed_time),
            minutes(self.bed_time_std_minutes),
            time(self.mean_wake_time),
            minutes(self.wake_time_std_minutes),
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn night(day: u32, bed: (u32, u32), wake: (u32, u32)) -> NightRecord {
        let date = NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        NightRecord {
            date,
            bed_time: date.and_hms_opt(bed.0, bed.1, 0),
            wake_time: date.succ_opt().unwrap().and_hms_opt(wake.0, wake.1, 0),
            ..Default::default()
        }
    }

    #[test]
    fn empty_nights() {
        let metrics = RegularityAnalyzer::new(&[]).metrics();
        assert_eq!(metrics, RegularityMetrics::default());
        assert_eq!(metrics.combined_minutes(), None);
    }

    #[test]
    fn single_night_has_no_spread() {
        let metrics = RegularityAnalyzer::new(&[night(1, (23, 0), (7, 0))]).metrics();
        assert_eq!(metrics.mean_bed_time, NaiveTime::from_hms_opt(23, 0, 0));
        assert_eq!(metrics.bed_time_std_minutes, None);
        assert_eq!(metrics.combined_minutes(), None);
    }

    #[test]
    fn spread_across_midnight() {
        let nights = [night(1, (23, 30), (7, 0)), night(2, (0, 30), (7, 0))];
        let metrics = RegularityAnalyzer::new(&nights).metrics();

        assert_eq!(metrics.mean_bed_time, NaiveTime::from_hms_opt(0, 0, 0));
        assert_eq!(metrics.bed_time_std_minutes, Some(30.0));
        assert_eq!(metrics.wake_time_std_minutes, Some(0.0));
        assert_eq!(metrics.combined_minutes(), Some(15.0));
    }

    #[test]
    fn late_wake_times_around_noon() {
        let nights = [night(1, (3, 0), (12, 30)), night(2, (4, 0), (13, 30))];
        let metrics = RegularityAnalyzer::new(&nights).metrics();

        assert_eq!(metrics.mean_wake_time, NaiveTime::from_hms_opt(13, 0, 0));
        assert_eq!(metrics.wake_time_std_minutes, Some(30.0));
        assert_eq!(metrics.mean_bed_time, NaiveTime::from_hms_opt(3, 30, 0));
        assert_eq!(metrics.combined_minutes(), Some(30.0));
    }

    #[test]
    fn day_sleeper_bed_times_around_noon() {
        let nights = [night(1, (11, 45), (19, 0)), night(2, (12, 15), (19, 30))];
        let metrics = RegularityAnalyzer::new(&nights).metrics();

        assert_eq!(metrics.mean_bed_time, NaiveTime::from_hms_opt(12, 0, 0));
        assert_eq!(metrics.bed_time_std_minutes, Some(15.0));
        assert_eq!(metrics.wake_time_std_minutes, Some(15.0));
        assert_eq!(
            metrics.to_string(),
            "Bed time: 12:00 (std 15 min)\nWake time: 19:15 (std 15 min)"
        );
    }
}
