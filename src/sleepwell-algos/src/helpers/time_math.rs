use std::f64::consts::TAU;

use chrono::{NaiveTime, Timelike as _};

const DAY_SECONDS: i64 = 86_400;

fn seconds(time: &NaiveTime) -> i64 {
    i64::from(time.num_seconds_from_midnight())
}

/// Circular mean of clock times, in seconds from midnight. Falls back to the
/// first time when the times cancel out around the clock.
fn clock_center(times: &[NaiveTime]) -> Option<i64> {
    let first = times.first()?;
    let (sin, cos) = times.iter().fold((0.0, 0.0), |(sin, cos), t| {
        let angle = seconds(t) as f64 * TAU / DAY_SECONDS as f64;
        (sin + angle.sin(), cos + angle.cos())
    });
    if sin.hypot(cos) < 1e-6 * times.len() as f64 {
        return Some(seconds(first));
    }

    let center = (sin.atan2(cos) / TAU * DAY_SECONDS as f64).round() as i64;
    Some(center.rem_euclid(DAY_SECONDS))
}

/// Signed distance from `center` to `time` on the clock, within half a day,
/// so 23:30 and 00:30 sit an hour apart instead of 23.
pub fn clock_offset(time: &NaiveTime, center: i64) -> i64 {
    let offset = (seconds(time) - center).rem_euclid(DAY_SECONDS);
    if offset > DAY_SECONDS / 2 {
        offset - DAY_SECONDS
    } else {
        offset
    }
}

fn offsets(times: &[NaiveTime]) -> Option<(i64, Vec<f64>)> {
    let center = clock_center(times)?;
    let offsets = times
        .iter()
        .map(|t| clock_offset(t, center) as f64)
        .collect();
    Some((center, offsets))
}

pub fn mean_time(times: &[NaiveTime]) -> Option<NaiveTime> {
    let (center, offsets) = offsets(times)?;
    let mean = (center + mean(&offsets)?.round() as i64).rem_euclid(DAY_SECONDS);
    NaiveTime::from_num_seconds_from_midnight_opt(mean as u32, 0)
}

/// Population standard deviation of clock times, in minutes.
pub fn std_time_minutes(times: &[NaiveTime]) -> Option<f64> {
    let (_, offsets) = offsets(times)?;
    let mean = mean(&offsets)?;
    let variance = offsets.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / offsets.len() as f64;
    Some(variance.sqrt() / 60.0)
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

pub fn round_float(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(h: u32, m: u32) -> NaiveTime {
        NaiveTime::from_hms_opt(h, m, 0).unwrap()
    }

    #[test]
    fn clock_offset_wraps_midnight() {
        assert_eq!(clock_offset(&t(8, 30), 0), 30600);
        assert_eq!(clock_offset(&t(22, 0), 0), -7200);
        assert_eq!(clock_offset(&t(0, 30), seconds(&t(23, 30))), 3600);
        assert_eq!(clock_offset(&t(12, 0), 0), 43200);
    }

    #[test]
    fn mean_time_empty() {
        assert_eq!(mean_time(&[]), None);
        assert_eq!(std_time_minutes(&[]), None);
    }

    #[test]
    fn mean_time_across_midnight() {
        assert_eq!(mean_time(&[t(23, 30), t(0, 30)]), Some(t(0, 0)));
        assert_eq!(mean_time(&[t(22, 0), t(23, 0)]), Some(t(22, 30)));
    }

    #[test]
    fn mean_time_across_noon() {
        assert_eq!(mean_time(&[t(12, 30), t(13, 30)]), Some(t(13, 0)));
        assert_eq!(mean_time(&[t(11, 0), t(13, 0)]), Some(t(12, 0)));
    }

    #[test]
    fn std_time_identical_values() {
        assert_eq!(std_time_minutes(&[t(8, 0), t(8, 0), t(8, 0)]), Some(0.0));
        assert_eq!(std_time_minutes(&[t(15, 0), t(15, 0)]), Some(0.0));
    }

    #[test]
    fn std_time_across_midnight() {
        let std = std_time_minutes(&[t(23, 30), t(0, 30)]).unwrap();
        assert!((std - 30.0).abs() < 1e-9);
    }

    #[test]
    fn std_time_across_noon() {
        let std = std_time_minutes(&[t(12, 30), t(13, 30)]).unwrap();
        assert!((std - 30.0).abs() < 1e-9);
    }

    #[test]
    fn opposite_times_fall_back_to_first() {
        assert_eq!(mean_time(&[t(0, 0), t(12, 0)]), Some(t(6, 0)));
        let std = std_time_minutes(&[t(0, 0), t(12, 0)]).unwrap();
        assert!((std - 360.0).abs() < 1e-9);
    }

    #[test]
    fn mean_empty_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0, 6.0]), Some(4.0));
    }

    #[test]
    fn round_float_basic() {
        assert_eq!(round_float(1.23456), 1.23);
        assert_eq!(round_float(1.999), 2.0);
        assert_eq!(round_float(0.0), 0.0);
    }
}
