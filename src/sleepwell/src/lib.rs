#[macro_use]
extern crate log;

mod config;
pub use config::{DEFAULT_SCORE_WINDOW, PipelineConfig};

mod error;
pub use error::SleepError;

mod session;
pub use session::{Dataset, SleepSession};

pub mod http;
