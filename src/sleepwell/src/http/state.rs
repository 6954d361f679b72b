use std::sync::Arc;

use crate::SleepSession;

#[derive(Clone)]
pub struct AppState {
    pub session: Arc<SleepSession>,
}

impl AppState {
    pub fn new(session: SleepSession) -> Self {
        Self {
            session: Arc::new(session),
        }
    }
}
