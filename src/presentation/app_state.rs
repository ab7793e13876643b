// Application state for HTTP handlers
use crate::application::monitor_service::MonitorService;
use crate::infrastructure::broadcast_sink::BroadcastSink;

#[derive(Clone)]
pub struct AppState {
    pub monitor_service: MonitorService,
    pub notices: BroadcastSink,
}
