use std::sync::Arc;

use crate::services::ThesisService;

#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ThesisService>,
}
