// Application state for HTTP handlers
use crate::application::plant_service::PlantService;
use crate::application::resolution_service::ResolutionService;
use crate::application::selection::SelectionService;
use crate::application::streaming_service::StreamingOverviewService;

#[derive(Clone)]
pub struct AppState {
    pub plant_service: PlantService,
    pub resolution_service: ResolutionService,
    pub streaming_service: StreamingOverviewService,
    pub selection_service: SelectionService,
}
