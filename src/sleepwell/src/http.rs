//! Thin HTTP transport over a [`SleepSession`](crate::SleepSession) for the
//! browser dashboard.

mod error;
pub use error::{ApiError, AppError};

mod handlers;

mod router;
pub use router::{MAX_UPLOAD_BYTES, create_router};

mod state;
pub use state::AppState;
