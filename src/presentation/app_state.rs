// Application state for HTTP handlers
use crate::application::power_graph_service::PowerGraphService;
use crate::infrastructure::data_files::DataFiles;
use crate::infrastructure::static_files::StaticFiles;

#[derive(Clone)]
pub struct AppState {
    pub power_graph: PowerGraphService,
    pub static_files: StaticFiles,
    pub data_files: DataFiles,
}
