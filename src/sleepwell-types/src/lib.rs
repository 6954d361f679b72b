#[macro_use]
extern crate serde;

mod observation;
pub use observation::{Observation, ObservationKind, ObservationValue, SleepStage, SleepStageInterval};

mod night;
pub use night::NightRecord;

mod summary;
pub use summary::{MetricSamples, Summary, Trend, Trends};

mod score;
pub use score::{Component, ComponentScores, Features, ScoreResult};
