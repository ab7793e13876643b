// Line source trait for telemetry transports
use crate::application::monitor_service::MonitorService;
use crate::infrastructure::line_decoder::DecodeError;
use async_trait::async_trait;

/// One newline-delimited frame, undecoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawLine {
    Bytes(Vec<u8>),
    /// The frame ran past the length cap and was discarded up to its newline.
    TooLong { limit: usize },
}

#[async_trait]
pub trait LineSource: Send {
    /// Next raw line, or `None` once the transport is closed
    async fn next_line(&mut self) -> anyhow::Result<Option<RawLine>>;

    /// Human-readable transport description for logs
    fn describe(&self) -> String;
}

/// Drain a source into the monitor until it closes or fails.
/// Returns the number of lines handled.
pub async fn pump<S: LineSource + ?Sized>(source: &mut S, service: &MonitorService) -> u64 {
    let peer = source.describe();
    let mut handled = 0;

    loop {
        match source.next_line().await {
            Ok(Some(RawLine::Bytes(line))) => {
                service.handle_bytes(&line);
                handled += 1;
            }
            Ok(Some(RawLine::TooLong { limit })) => {
                service.reject_line(DecodeError::LineTooLong { limit });
                handled += 1;
            }
            Ok(None) => {
                tracing::info!(%peer, handled, "Telemetry source closed");
                break;
            }
            Err(e) => {
                tracing::warn!(%peer, handled, error = %e, "Telemetry source failed");
                break;
            }
        }
    }

    handled
}
