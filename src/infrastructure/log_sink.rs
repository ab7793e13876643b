// Alert sink that writes notices to the tracing log
use crate::application::alert_sink::AlertSink;
use crate::domain::notice::Notice;

#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl AlertSink for LogSink {
    fn notify(&self, notice: &Notice) {
        match notice {
            Notice::ElevatedTrend { series_kind, series_id, source_id, slope, .. } => {
                tracing::warn!(
                    ?series_kind,
                    series_id,
                    source_id,
                    slope,
                    "{}",
                    notice
                );
            }
            Notice::TopologyDiscovered { count, .. } => {
                tracing::info!(count, "{}", notice);
            }
        }
    }
}
