use std::{fmt, str::FromStr};

/// One physiological dimension of the Sleep Health Score.
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
    strum::EnumIter,
)]
#[serde(rename_all = "snake_case")]
pub enum Component {
    Duration,
    Regularity,
    HeartRate,
    Hrv,
    Respiratory,
}

impl Component {
    /// Name used in the score explanation. The dashboard matches on these
    /// exact strings.
    pub fn label(self) -> &'static str {
        match self {
            Self::Duration => "Duration",
            Self::Regularity => "Regularity",
            Self::HeartRate => "Heart rate",
            Self::Hrv => "HRV",
            Self::Respiratory => "Respiratory",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Component {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Duration" => Ok(Self::Duration),
            "Regularity" => Ok(Self::Regularity),
            "Heart rate" => Ok(Self::HeartRate),
            "HRV" => Ok(Self::Hrv),
            "Respiratory" => Ok(Self::Respiratory),
            other => Err(format!("unknown score component `{other}`")),
        }
    }
}

/// Sub-scores keyed by component; `None` when the input was unavailable.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentScores {
    pub duration: Option<u8>,
    pub regularity: Option<u8>,
    pub heart_rate: Option<u8>,
    pub hrv: Option<u8>,
    pub respiratory: Option<u8>,
}

impl ComponentScores {
    pub fn get(&self, component: Component) -> Option<u8> {
        match component {
            Component::Duration => self.duration,
            Component::Regularity => self.regularity,
            Component::HeartRate => self.heart_rate,
            Component::Hrv => self.hrv,
            Component::Respiratory => self.respiratory,
        }
    }

    pub fn set(&mut self, component: Component, value: Option<u8>) {
        let slot = match component {
            Component::Duration => &mut self.duration,
            Component::Regularity => &mut self.regularity,
            Component::HeartRate => &mut self.heart_rate,
            Component::Hrv => &mut self.hrv,
            Component::Respiratory => &mut self.respiratory,
        };
        *slot = value;
    }

    pub fn available(&self) -> usize {
        [
            self.duration,
            self.regularity,
            self.heart_rate,
            self.hrv,
            self.respiratory,
        ]
        .iter()
        .flatten()
        .count()
    }
}

/// Inputs to the score engine, one per component.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Features {
    pub total_sleep_hours: Option<f64>,
    /// Mean of the bed and wake time standard deviations, in minutes.
    pub regularity_minutes: Option<f64>,
    pub avg_hr: Option<f64>,
    pub avg_hrv: Option<f64>,
    pub avg_resp: Option<f64>,
}

impl Features {
    pub fn get(&self, component: Component) -> Option<f64> {
        match component {
            Component::Duration => self.total_sleep_hours,
            Component::Regularity => self.regularity_minutes,
            Component::HeartRate => self.avg_hr,
            Component::Hrv => self.avg_hrv,
            Component::Respiratory => self.avg_resp,
        }
    }

    pub fn set(&mut self, component: Component, value: f64) {
        let slot = match component {
            Component::Duration => &mut self.total_sleep_hours,
            Component::Regularity => &mut self.regularity_minutes,
            Component::HeartRate => &mut self.avg_hr,
            Component::Hrv => &mut self.avg_hrv,
            Component::Respiratory => &mut self.avg_resp,
        };
        *slot = Some(value);
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub score: u8,
    pub component_scores: ComponentScores,
    pub explanation: String,
    pub features: Features,
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn labels_parse_back() {
        for component in Component::iter() {
            assert_eq!(component.label().parse::<Component>(), Ok(component));
        }
        assert!("Steps".parse::<Component>().is_err());
    }

    #[test]
    fn component_scores_keep_nulls() {
        let mut scores = ComponentScores::default();
        scores.set(Component::Duration, Some(100));
        scores.set(Component::HeartRate, Some(93));

        assert_eq!(scores.available(), 2);
        let json = serde_json::to_value(scores).unwrap();
        assert_eq!(json["duration"], 100);
        assert_eq!(json["heart_rate"], 93);
        assert!(json["hrv"].is_null());
        assert!(json["regularity"].is_null());
    }
}
