// Telemetry transports - TCP line listener and generic async reader source
use crate::application::line_source::{LineSource, RawLine, pump};
use crate::application::monitor_service::MonitorService;
use anyhow::Context;
use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::net::TcpListener;

pub const DEFAULT_MAX_LINE_LENGTH: usize = 1024;

/// Newline-framed source over any async byte stream (TCP connection, stdin).
/// Lines longer than `max_line_length` are discarded up to the next newline.
pub struct ReaderLineSource<R> {
    reader: BufReader<R>,
    max_line_length: usize,
    description: String,
}

impl<R: AsyncRead + Unpin> ReaderLineSource<R> {
    pub fn new(reader: R, description: impl Into<String>, max_line_length: usize) -> Self {
        Self {
            reader: BufReader::new(reader),
            max_line_length,
            description: description.into(),
        }
    }
}

#[async_trait]
impl<R: AsyncRead + Unpin + Send> LineSource for ReaderLineSource<R> {
    async fn next_line(&mut self) -> anyhow::Result<Option<RawLine>> {
        let mut line = Vec::new();
        let mut too_long = false;

        loop {
            let available = self
                .reader
                .fill_buf()
                .await
                .with_context(|| format!("Failed to read from {}", self.description))?;
            if available.is_empty() {
                if line.is_empty() && !too_long {
                    return Ok(None);
                }
                break;
            }

            let (taken, consumed, complete) = match available.iter().position(|&b| b == b'\n') {
                Some(newline) => (newline, newline + 1, true),
                None => (available.len(), available.len(), false),
            };
            if !too_long {
                if line.len() + taken > self.max_line_length {
                    too_long = true;
                    line = Vec::new();
                } else {
                    line.extend_from_slice(&available[..taken]);
                }
            }
            self.reader.consume(consumed);

            if complete {
                break;
            }
        }

        if too_long {
            return Ok(Some(RawLine::TooLong {
                limit: self.max_line_length,
            }));
        }
        if line.last() == Some(&b'\r') {
            line.pop();
        }
        Ok(Some(RawLine::Bytes(line)))
    }

    fn describe(&self) -> String {
        self.description.clone()
    }
}

/// Accepts base station connections and pumps each one into the monitor.
pub struct TelemetryListener {
    listener: TcpListener,
    service: MonitorService,
    max_line_length: usize,
}

impl TelemetryListener {
    pub async fn bind(
        addr: &str,
        service: MonitorService,
        max_line_length: usize,
    ) -> anyhow::Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .with_context(|| format!("Failed to bind telemetry listener on {}", addr))?;
        Ok(Self {
            listener,
            service,
            max_line_length,
        })
    }

    pub fn local_addr(&self) -> anyhow::Result<std::net::SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub async fn run(self) -> anyhow::Result<()> {
        tracing::info!("Listening for telemetry on {}", self.local_addr()?);

        loop {
            let (stream, peer) = match self.listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    tracing::warn!(error = %e, "Failed to accept telemetry connection");
                    continue;
                }
            };

            tracing::info!(%peer, "Telemetry connection opened");
            let service = self.service.clone();
            let max_line_length = self.max_line_length;
            tokio::spawn(async move {
                let mut source = ReaderLineSource::new(stream, peer.to_string(), max_line_length);
                pump(&mut source, &service).await;
            });
        }
    }
}

/// Pump telemetry typed or piped into stdin.
pub async fn run_stdin(service: MonitorService, max_line_length: usize) {
    let mut source = ReaderLineSource::new(tokio::io::stdin(), "stdin", max_line_length);
    pump(&mut source, &service).await;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::alert_sink::AlertDispatcher;
    use crate::application::alert_sink::testing::RecordingSink;
    use crate::application::router::{ReadingRouter, RouterSettings};
    use std::sync::Arc;
    use std::time::Duration;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    fn service_with_sink() -> (MonitorService, Arc<RecordingSink>) {
        let sink = Arc::new(RecordingSink::default());
        let router = Arc::new(ReadingRouter::new(RouterSettings::default()));
        let service = MonitorService::new(router, AlertDispatcher::new().with_sink(sink.clone()));
        (service, sink)
    }

    fn bytes(line: &[u8]) -> Option<RawLine> {
        Some(RawLine::Bytes(line.to_vec()))
    }

    #[tokio::test]
    async fn test_reader_source_splits_lines() {
        let input: &[u8] = b"Data1.0;2.0;50;220\r\nSystema,b;x\n\nlast";
        let mut source = ReaderLineSource::new(input, "memory", DEFAULT_MAX_LINE_LENGTH);

        assert_eq!(source.next_line().await.unwrap(), bytes(b"Data1.0;2.0;50;220"));
        assert_eq!(source.next_line().await.unwrap(), bytes(b"Systema,b;x"));
        assert_eq!(source.next_line().await.unwrap(), bytes(b""));
        assert_eq!(source.next_line().await.unwrap(), bytes(b"last"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reader_source_passes_invalid_utf8_through() {
        let input: &[u8] = b"Data\xff;4.0;80;220\nData1.0;4.0;80;220\n";
        let mut source = ReaderLineSource::new(input, "memory", DEFAULT_MAX_LINE_LENGTH);

        assert_eq!(source.next_line().await.unwrap(), bytes(b"Data\xff;4.0;80;220"));
        assert_eq!(source.next_line().await.unwrap(), bytes(b"Data1.0;4.0;80;220"));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_reader_source_discards_oversized_lines_and_resyncs() {
        // Longer than the internal read buffer so the cap is hit across refills.
        let mut input = vec![b'x'; 20_000];
        input.extend_from_slice(b"\nData1.0;4.0;80;220\n");
        input.extend_from_slice(&[b'y'; 40]);
        let mut source = ReaderLineSource::new(&input[..], "memory", 32);

        assert_eq!(source.next_line().await.unwrap(), Some(RawLine::TooLong { limit: 32 }));
        assert_eq!(source.next_line().await.unwrap(), bytes(b"Data1.0;4.0;80;220"));
        assert_eq!(source.next_line().await.unwrap(), Some(RawLine::TooLong { limit: 32 }));
        assert_eq!(source.next_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_pump_survives_invalid_utf8_line() {
        let (service, sink) = service_with_sink();
        let input: &[u8] =
            b"Data1.0;4.0;80;220\nData\xff;4.0;80;220\nData2.0;4.0;80;220\nData5.0;4.0;80;220\n";
        let mut source = ReaderLineSource::new(input, "memory", DEFAULT_MAX_LINE_LENGTH);

        assert_eq!(pump(&mut source, &service).await, 4);
        let stats = service.stats();
        assert_eq!(stats.readings, 3);
        assert_eq!(stats.dropped, 1);
        assert_eq!(sink.alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_pump_reader_end_to_end() {
        let (service, sink) = service_with_sink();
        let input: &[u8] = b"Data1.0;4.0;80;220\nData2.0;4.0;80;220\nbogus\nData5.0;4.0;80;220\n";
        let mut source = ReaderLineSource::new(input, "memory", DEFAULT_MAX_LINE_LENGTH);

        assert_eq!(pump(&mut source, &service).await, 4);
        assert_eq!(sink.alerts().len(), 1);
    }

    #[tokio::test]
    async fn test_tcp_listener_feeds_monitor() {
        let (service, sink) = service_with_sink();
        let listener = TelemetryListener::bind("127.0.0.1:0", service.clone(), 64)
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(listener.run());

        let mut stream = TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"Systemtop,bottom;1\nData1.0;4.0;80;220\nData2.0;4.0;80;220\n")
            .await
            .unwrap();
        stream.write_all(&[b'z'; 200]).await.unwrap();
        stream.write_all(b"\nData\xfe\nData5.0;4.0;80;220\n").await.unwrap();
        stream.shutdown().await.unwrap();

        for _ in 0..100 {
            if service.stats().lines == 6 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }

        assert_eq!(service.stats().lines, 6);
        assert_eq!(service.stats().dropped, 2);
        assert_eq!(sink.notices().len(), 2);
        assert_eq!(sink.alerts().len(), 1);
    }
}
