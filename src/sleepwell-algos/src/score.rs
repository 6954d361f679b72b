use std::collections::{HashMap, HashSet};

use sleepwell_types::{Component, ComponentScores, Features, NightRecord, ScoreResult};
use strum::IntoEnumIterator;
use thiserror::Error;

use crate::{RegularityAnalyzer, explanation::format_explanation, helpers::time_math::mean};

/// Score requested without enough usable components.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error(
    "not enough data to score sleep: {available} component(s) available, need duration or at least {min}",
    min = ScoreEngine::MIN_COMPONENTS
)]
pub struct InsufficientDataError {
    pub available: usize,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ComponentWeights {
    pub duration: f64,
    pub regularity: f64,
    pub heart_rate: f64,
    pub hrv: f64,
    pub respiratory: f64,
}

impl Default for ComponentWeights {
    fn default() -> Self {
        Self {
            duration: 0.30,
            regularity: 0.175,
            heart_rate: 0.175,
            hrv: 0.175,
            respiratory: 0.175,
        }
    }
}

impl ComponentWeights {
    pub fn get(&self, component: Component) -> f64 {
        match component {
            Component::Duration => self.duration,
            Component::Regularity => self.regularity,
            Component::HeartRate => self.heart_rate,
            Component::Hrv => self.hrv,
            Component::Respiratory => self.respiratory,
        }
    }

    pub fn scaled(self, factor: f64) -> Self {
        Self {
            duration: self.duration * factor,
            regularity: self.regularity * factor,
            heart_rate: self.heart_rate * factor,
            hrv: self.hrv * factor,
            respiratory: self.respiratory * factor,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScoreConfig {
    pub weights: ComponentWeights,
    /// Shifts the HRV target range down for older people.
    pub age: Option<u32>,
}

/// Healthy band for one physiological value. Outside it the sub-score falls
/// linearly and reaches 0 at `tolerance` away from the nearest bound. A
/// `None` tolerance leaves that side unpenalised.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TargetRange {
    pub low: f64,
    pub high: f64,
    pub below: Option<f64>,
    pub above: Option<f64>,
}

impl TargetRange {
    pub fn score(&self, value: f64) -> f64 {
        let (distance, tolerance) = if value < self.low {
            (self.low - value, self.below)
        } else if value > self.high {
            (value - self.high, self.above)
        } else {
            return 100.0;
        };

        match tolerance {
            Some(tolerance) if tolerance > 0.0 => (100.0 * (1.0 - distance / tolerance)).max(0.0),
            Some(_) => 0.0,
            None => 100.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct ScoreEngine {
    config: ScoreConfig,
}

impl ScoreEngine {
    /// Without duration, at least this many components must be available.
    pub const MIN_COMPONENTS: usize = 2;

    pub fn new(config: ScoreConfig) -> Self {
        Self { config }
    }

    pub fn target(&self, component: Component) -> TargetRange {
        match component {
            Component::Duration => TargetRange {
                low: 7.0,
                high: 9.0,
                below: Some(3.0),
                above: Some(3.0),
            },
            Component::Regularity => TargetRange {
                low: 0.0,
                high: 30.0,
                below: None,
                above: Some(90.0),
            },
            Component::HeartRate => TargetRange {
                low: 50.0,
                high: 65.0,
                below: Some(15.0),
                above: Some(25.0),
            },
            Component::Hrv => {
                let factor = self.hrv_age_factor();
                TargetRange {
                    low: 60.0 * factor,
                    high: 90.0 * factor,
                    below: Some(40.0 * factor),
                    above: None,
                }
            }
            Component::Respiratory => TargetRange {
                low: 12.0,
                high: 20.0,
                below: Some(6.0),
                above: Some(6.0),
            },
        }
    }

    fn hrv_age_factor(&self) -> f64 {
        match self.config.age {
            Some(age) if age > 30 => (1.0 - 0.01 * f64::from(age - 30)).max(0.5),
            _ => 1.0,
        }
    }

    /// Weighted mean of the sub-scores that could be computed. Missing
    /// components drop out of both the sum and the weight total.
    pub fn score(&self, features: &Features) -> Result<ScoreResult, InsufficientDataError> {
        let mut component_scores = ComponentScores::default();
        let mut weighted = 0.0;
        let mut total_weight = 0.0;

        for component in Component::iter() {
            let weight = self.config.weights.get(component);
            let Some(value) = features.get(component).filter(|v| v.is_finite()) else {
                continue;
            };
            if !weight.is_finite() || weight <= 0.0 {
                continue;
            }

            let sub_score = self.target(component).score(value).round().clamp(0.0, 100.0) as u8;
            component_scores.set(component, Some(sub_score));
            weighted += weight * f64::from(sub_score);
            total_weight += weight;
        }

        let available = component_scores.available();
        if (component_scores.duration.is_none() && available < Self::MIN_COMPONENTS)
            || total_weight <= 0.0
        {
            return Err(InsufficientDataError { available });
        }

        let score = (weighted / total_weight).round().clamp(0.0, 100.0) as u8;
        debug!("sleep score {} from {} component(s)", score, available);

        Ok(ScoreResult {
            score,
            component_scores,
            explanation: format_explanation(score, &component_scores),
            features: *features,
        })
    }

    pub fn score_night(&self, night: &NightRecord) -> Result<ScoreResult, InsufficientDataError> {
        self.score(&features_from_nights(std::slice::from_ref(night)))
    }
}

/// Score inputs from a window of nights: each metric averaged over the nights
/// that have it, regularity from the spread of bed and wake times.
pub fn features_from_nights(nights: &[NightRecord]) -> Features {
    let average = |metric: fn(&NightRecord) -> Option<f64>| {
        let values = nights.iter().filter_map(metric).collect::<Vec<_>>();
        mean(&values)
    };

    Features {
        total_sleep_hours: average(|n| n.total_sleep_hours),
        regularity_minutes: RegularityAnalyzer::new(nights).metrics().combined_minutes(),
        avg_hr: average(|n| n.avg_hr),
        avg_hrv: average(|n| n.avg_hrv),
        avg_resp: average(|n| n.avg_resp),
    }
}

/// Accepted override keys. When a request names one component under several
/// keys, the first key listed here with a finite value wins.
const OVERRIDE_KEYS: &[(&str, Component)] = &[
    ("total_sleep_hours", Component::Duration),
    ("avg_total_sleep", Component::Duration),
    ("avg_sleep_hours", Component::Duration),
    ("sleep_hours", Component::Duration),
    ("regularity_minutes", Component::Regularity),
    ("regularity", Component::Regularity),
    ("avg_hr", Component::HeartRate),
    ("heart_rate", Component::HeartRate),
    ("avg_hrv", Component::Hrv),
    ("hrv", Component::Hrv),
    ("resp_rate", Component::Respiratory),
    ("avg_resp", Component::Respiratory),
    ("avg_resp_rate", Component::Respiratory),
];

/// Replaces export-derived inputs with caller-supplied ones. Unknown keys and
/// non-finite values are ignored.
pub fn apply_overrides(mut features: Features, overrides: &HashMap<String, f64>) -> Features {
    for key in overrides.keys() {
        if !OVERRIDE_KEYS.iter().any(|(known, _)| known == key) {
            warn!("ignoring unknown score feature `{}`", key);
        }
    }

    let mut overridden = HashSet::new();
    for (key, component) in OVERRIDE_KEYS {
        let Some(value) = overrides.get(*key) else {
            continue;
        };
        if !value.is_finite() {
            warn!("ignoring non-finite value for score feature `{}`", key);
            continue;
        }
        if overridden.insert(*component) {
            features.set(*component, *value);
        } else {
            debug!("score feature `{}` shadowed by an earlier alias", key);
        }
    }
    features
}
