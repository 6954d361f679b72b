#[macro_use]
extern crate log;

pub(crate) mod segment;
pub use segment::{NightSegmenter, SegmenterConfig};

pub(crate) mod aggregate;
pub use aggregate::{AggregatorConfig, NightAggregator, rem_percentage};

pub(crate) mod regularity;
pub use regularity::{RegularityAnalyzer, RegularityMetrics};

pub(crate) mod summary;
pub use summary::summarize;

pub(crate) mod score;
pub use score::{
    ComponentWeights, InsufficientDataError, ScoreConfig, ScoreEngine, TargetRange,
    apply_overrides, features_from_nights,
};

pub(crate) mod explanation;
pub use explanation::{format_explanation, parse_explanation};

pub mod helpers;
