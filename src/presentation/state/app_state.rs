use std::sync::Arc;

use crate::application::ports::PostRepository;
use crate::application::services::{CloseService, CounselService, ReflectionService, SweepService};
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub sweep_service: Arc<SweepService>,
    pub close_service: Arc<CloseService>,
    pub reflection_service: Arc<ReflectionService>,
    pub counsel_service: Arc<CounselService>,
    pub post_repository: Arc<dyn PostRepository>,
    pub settings: Settings,
}
