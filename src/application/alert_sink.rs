// Alert sink capability - subscribers that present notices to an operator
use crate::domain::notice::Notice;
use std::sync::Arc;

pub trait AlertSink: Send + Sync {
    /// Present a notice. Must not block the caller for long.
    fn notify(&self, notice: &Notice);
}

/// Fans every notice out to all registered sinks, in registration order.
#[derive(Clone, Default)]
pub struct AlertDispatcher {
    sinks: Vec<Arc<dyn AlertSink>>,
}

impl AlertDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sink(mut self, sink: Arc<dyn AlertSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn dispatch(&self, notice: &Notice) {
        for sink in &self.sinks {
            sink.notify(notice);
        }
    }
}
