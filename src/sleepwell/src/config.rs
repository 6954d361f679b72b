use sleepwell_algos::{AggregatorConfig, ScoreConfig, SegmenterConfig};

/// Nights scored when the caller does not pick a window.
pub const DEFAULT_SCORE_WINDOW: usize = 7;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PipelineConfig {
    pub segmenter: SegmenterConfig,
    pub aggregator: AggregatorConfig,
    pub score: ScoreConfig,
    /// Most recent nights that feed the score.
    pub score_window: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            segmenter: SegmenterConfig::default(),
            aggregator: AggregatorConfig::default(),
            score: ScoreConfig::default(),
            score_window: DEFAULT_SCORE_WINDOW,
        }
    }
}
