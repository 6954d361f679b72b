use std::{collections::HashMap, sync::Arc};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use sleepwell_algos::{
    NightAggregator, NightSegmenter, ScoreEngine, apply_overrides, features_from_nights, summarize,
};
use sleepwell_types::{Features, NightRecord, ScoreResult, Summary};

use crate::{PipelineConfig, SleepError};

/// Everything derived from one uploaded export.
#[derive(Debug, Clone, PartialEq)]
pub struct Dataset {
    /// One record per night, in date order.
    pub nights: Vec<NightRecord>,
    pub observation_count: usize,
    pub ingested_at: DateTime<Utc>,
}

/// The export currently being analysed and the operations on it.
///
/// A new ingest swaps the whole dataset in one step; readers holding the
/// previous one keep a complete copy until they finish.
pub struct SleepSession {
    config: PipelineConfig,
    dataset: RwLock<Option<Arc<Dataset>>>,
}

impl Default for SleepSession {
    fn default() -> Self {
        Self::new(PipelineConfig::default())
    }
}

impl SleepSession {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            dataset: RwLock::new(None),
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Parses, segments and aggregates an export, then makes it the current
    /// dataset. On failure the previous dataset stays in place.
    pub fn ingest(&self, raw: &[u8]) -> Result<Arc<Dataset>, SleepError> {
        let dataset = Arc::new(self.process(raw)?);
        info!(
            "ingested {} nights from {} observations",
            dataset.nights.len(),
            dataset.observation_count
        );

        *self.dataset.write() = Some(Arc::clone(&dataset));
        Ok(dataset)
    }

    /// Runs the pipeline without touching the session state.
    pub fn process(&self, raw: &[u8]) -> Result<Dataset, SleepError> {
        let observations = sleepwell_codec::extract(raw, None)?;
        let observation_count = observations.len();

        let segmenter = NightSegmenter::new(self.config.segmenter);
        let aggregator = NightAggregator::new(self.config.aggregator);
        let nights = segmenter
            .segment(observations)
            .into_iter()
            .map(|(date, observations)| aggregator.aggregate(date, &observations))
            .collect::<Vec<_>>();

        if nights.is_empty() {
            return Err(SleepError::NoSleepDataFound);
        }

        Ok(Dataset {
            nights,
            observation_count,
            ingested_at: Utc::now(),
        })
    }

    pub fn dataset(&self) -> Option<Arc<Dataset>> {
        self.dataset.read().clone()
    }

    pub fn nights(&self) -> Result<Vec<NightRecord>, SleepError> {
        Ok(self.current()?.nights.clone())
    }

    pub fn get_summary(&self) -> Result<Summary, SleepError> {
        Ok(summarize(&self.current()?.nights))
    }

    /// Scores the most recent nights. `overrides` replace the export-derived
    /// value of the components they name; with no export loaded they are
    /// scored on their own.
    pub fn get_score(
        &self,
        overrides: Option<&HashMap<String, f64>>,
    ) -> Result<ScoreResult, SleepError> {
        let features = match (self.dataset(), overrides) {
            (Some(dataset), _) => {
                let window = self.config.score_window.max(1);
                let start = dataset.nights.len().saturating_sub(window);
                features_from_nights(&dataset.nights[start..])
            }
            (None, Some(overrides)) if !overrides.is_empty() => Features::default(),
            (None, _) => return Err(SleepError::NoDataUploaded),
        };

        let features = match overrides {
            Some(overrides) => apply_overrides(features, overrides),
            None => features,
        };

        Ok(ScoreEngine::new(self.config.score).score(&features)?)
    }

    fn current(&self) -> Result<Arc<Dataset>, SleepError> {
        self.dataset().ok_or(SleepError::NoDataUploaded)
    }
}
