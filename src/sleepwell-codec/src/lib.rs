#[macro_use]
extern crate log;

mod error;
pub use error::ExportError;

mod container;
pub use container::ExportFormat;

mod helpers;
pub use helpers::parse_apple_date;

mod record;

mod extract;
pub use extract::{ExtractStats, Extraction, extract, extract_with_stats};
