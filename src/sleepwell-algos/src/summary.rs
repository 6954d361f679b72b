use sleepwell_types::{MetricSamples, NightRecord, Summary, Trend, Trends};

use crate::{
    RegularityAnalyzer,
    helpers::time_math::{mean, round_float},
};

/// Fewest nights with a metric before a trend is reported for it.
pub const MIN_TREND_NIGHTS: usize = 4;
/// Relative change between halves that still counts as stable.
const STABLE_BAND: f64 = 0.05;

/// Folds nightly records into one summary. Expects nights in date order.
pub fn summarize(nights: &[NightRecord]) -> Summary {
    if nights.is_empty() {
        return Summary::default();
    }

    let total_sleep = values(nights, |n| n.total_sleep_hours);
    let hr = values(nights, |n| n.avg_hr);
    let hrv = values(nights, |n| n.avg_hrv);
    let resp = values(nights, |n| n.avg_resp);
    let rem_pct = values(nights, |n| n.rem_percentage);

    let regularity = RegularityAnalyzer::new(nights).metrics();

    Summary {
        nights_tracked: nights.len(),
        avg_total_sleep: mean(&total_sleep).map(round_float),
        avg_hr: mean(&hr).map(round_float),
        avg_hrv: mean(&hrv).map(round_float),
        avg_resp_rate: mean(&resp).map(round_float),
        avg_rem_pct: mean(&rem_pct).map(|v| (v * 10_000.0).round() / 10_000.0),
        total_sleep_hours: (!total_sleep.is_empty())
            .then(|| round_float(total_sleep.iter().sum())),
        first_night: nights.iter().map(|n| n.date).min(),
        last_night: nights.iter().map(|n| n.date).max(),
        mean_bed_time: regularity.mean_bed_time,
        mean_wake_time: regularity.mean_wake_time,
        bed_time_std_minutes: regularity.bed_time_std_minutes,
        wake_time_std_minutes: regularity.wake_time_std_minutes,
        samples: MetricSamples {
            total_sleep: total_sleep.len(),
            hr: hr.len(),
            hrv: hrv.len(),
            resp_rate: resp.len(),
            rem_pct: rem_pct.len(),
        },
        trends: Trends {
            sleep_duration: trend(&total_sleep, true),
            heart_rate: trend(&hr, false),
            hrv: trend(&hrv, true),
        },
    }
}

fn values(nights: &[NightRecord], metric: impl Fn(&NightRecord) -> Option<f64>) -> Vec<f64> {
    nights
        .iter()
        .filter_map(metric)
        .filter(|v| v.is_finite())
        .collect()
}

/// Compares the later half of the series with the earlier half.
fn trend(series: &[f64], higher_is_better: bool) -> Option<Trend> {
    if series.len() < MIN_TREND_NIGHTS {
        return None;
    }

    let (earlier, later) = series.split_at(series.len() / 2);
    let earlier = mean(earlier)?;
    let later = mean(later)?;
    if earlier == 0.0 {
        return None;
    }

    let change = (later - earlier) / earlier.abs();
    let trend = if change.abs() <= STABLE_BAND {
        Trend::Stable
    } else if (change > 0.0) == higher_is_better {
        Trend::Improving
    } else {
        Trend::Declining
    };
    Some(trend)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn night(day: u32) -> NightRecord {
        NightRecord {
            date: NaiveDate::from_ymd_opt(2025, 2, day).unwrap(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_is_no_data() {
        let summary = summarize(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.avg_total_sleep, None);
        assert_eq!(summary.avg_hr, None);
        assert_eq!(summary.samples, MetricSamples::default());
    }

    #[test]
    fn single_night() {
        let summary = summarize(&[NightRecord {
            total_sleep_hours: Some(8.0),
            avg_hr: Some(60.0),
            ..night(1)
        }]);

        assert_eq!(summary.nights_tracked, 1);
        assert_eq!(summary.avg_total_sleep, Some(8.0));
        assert_eq!(summary.avg_hr, Some(60.0));
        assert_eq!(summary.avg_hrv, None);
        assert_eq!(summary.first_night, summary.last_night);
        assert_eq!(summary.trends, Trends::default());
    }

    #[test]
    fn independent_denominators() {
        let nights = [
            NightRecord {
                total_sleep_hours: Some(6.0),
                avg_hr: Some(50.0),
                avg_hrv: Some(40.0),
                ..night(1)
            },
            NightRecord {
                total_sleep_hours: Some(8.0),
                avg_hr: Some(70.0),
                ..night(2)
            },
            NightRecord {
                total_sleep_hours: Some(7.0),
                ..night(3)
            },
        ];

        let summary = summarize(&nights);
        assert_eq!(summary.nights_tracked, 3);
        assert_eq!(summary.avg_total_sleep, Some(7.0));
        assert_eq!(summary.avg_hr, Some(60.0));
        assert_eq!(summary.avg_hrv, Some(40.0));
        assert_eq!(summary.avg_resp_rate, None);
        assert_eq!(summary.total_sleep_hours, Some(21.0));
        assert_eq!(
            summary.samples,
            MetricSamples {
                total_sleep: 3,
                hr: 2,
                hrv: 1,
                resp_rate: 0,
                rem_pct: 0,
            }
        );
    }

    #[test]
    fn sample_counts_never_exceed_nights() {
        let nights = (1..=10)
            .map(|day| NightRecord {
                total_sleep_hours: (day % 2 == 0).then_some(7.5),
                avg_hr: (day % 3 == 0).then_some(58.0),
                avg_resp: Some(14.0),
                ..night(day)
            })
            .collect::<Vec<_>>();

        let summary = summarize(&nights);
        let samples = summary.samples;
        for count in [samples.total_sleep, samples.hr, samples.hrv, samples.resp_rate, samples.rem_pct] {
            assert!(count <= summary.nights_tracked);
        }
        assert_eq!(samples.hrv, 0);
        assert_eq!(summary.avg_hrv, None);
        assert_eq!(samples.resp_rate, 10);
    }

    #[test]
    fn trends() {
        let nights = [55.0, 56.0, 62.0, 63.0]
            .into_iter()
            .zip(1..)
            .map(|(hr, day)| NightRecord {
                avg_hr: Some(hr),
                total_sleep_hours: Some(7.0),
                avg_hrv: Some(if day <= 2 { 60.0 } else { 45.0 }),
                ..night(day)
            })
            .collect::<Vec<_>>();

        let trends = summarize(&nights).trends;
        assert_eq!(trends.heart_rate, Some(Trend::Declining));
        assert_eq!(trends.sleep_duration, Some(Trend::Stable));
        assert_eq!(trends.hrv, Some(Trend::Declining));

        assert_eq!(trend(&[60.0, 60.0, 50.0, 50.0], false), Some(Trend::Improving));
        assert_eq!(trend(&[6.0, 6.0, 8.0], true), None);
    }
}
