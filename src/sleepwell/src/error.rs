use sleepwell_algos::InsufficientDataError;
use sleepwell_codec::ExportError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SleepError {
    #[error("unrecognized export format: {0}")]
    UnrecognizedFormat(String),
    #[error("the export was read but contains no usable sleep nights")]
    NoSleepDataFound,
    #[error("no sleep data available, upload an export first")]
    NoDataUploaded,
    #[error("insufficient data to compute a sleep score: {available} component(s) available")]
    InsufficientData { available: usize },
}

impl From<ExportError> for SleepError {
    fn from(error: ExportError) -> Self {
        Self::UnrecognizedFormat(error.to_string())
    }
}

impl From<InsufficientDataError> for SleepError {
    fn from(error: InsufficientDataError) -> Self {
        Self::InsufficientData {
            available: error.available,
        }
    }
}
