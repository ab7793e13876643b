// Alert sink that fans notices out to live subscribers (HTTP streams)
use crate::application::alert_sink::AlertSink;
use crate::domain::notice::Notice;
use tokio::sync::broadcast;

#[derive(Debug, Clone)]
pub struct BroadcastSink {
    sender: broadcast::Sender<Notice>,
}

impl BroadcastSink {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.sender.subscribe()
    }
}

impl AlertSink for BroadcastSink {
    fn notify(&self, notice: &Notice) {
        // No receivers is fine; nobody is watching the stream yet.
        let _ = self.sender.send(notice.clone());
    }
}
