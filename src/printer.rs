// File: src/printer.rs
//! Output sinks for the rendered report.
//!
//! `SerialPrinter` drives the physical receipt printer; `ConsoleSink` is the
//! fallback used when the device is unreachable (and for `--console` runs).
//! A sink guarantees in-order writes within one report. Exclusivity across
//! jobs is the runner's responsibility, not the sink's.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use tokio::io::AsyncWriteExt;

#[derive(Debug, Error)]
pub enum PrintError {
    #[error("printer unavailable at {0}: {1}")]
    Connect(String, String),
    #[error("printer write failed: {0}")]
    Write(String),
}

#[async_trait]
pub trait ReportSink: Send + Sync {
    async fn write_lines(&self, lines: &[String]) -> Result<(), PrintError>;
}

/// Receipt printer behind a serial device node (e.g. an RFCOMM port bound
/// to a bluetooth thermal printer). The device is opened per job and closed
/// when the report is fully written.
///
/// The baud rate is carried from configuration for interface fidelity;
/// RFCOMM/SPP transports ignore it and the port is otherwise assumed to be
/// pre-configured.
pub struct SerialPrinter {
    port: PathBuf,
    baudrate: u32,
    timeout: Duration,
}

impl SerialPrinter {
    pub fn new(port: impl Into<PathBuf>, baudrate: u32, timeout: Duration) -> Self {
        Self {
            port: port.into(),
            baudrate,
            timeout,
        }
    }

    fn port_display(&self) -> String {
        self.port.to_string_lossy().to_string()
    }
}

#[async_trait]
impl ReportSink for SerialPrinter {
    async fn write_lines(&self, lines: &[String]) -> Result<(), PrintError> {
        let mut options = tokio::fs::OpenOptions::new();
        options.write(true);
        let open = options.open(&self.port);
        let mut device = tokio::time::timeout(self.timeout, open)
            .await
            .map_err(|_| {
                PrintError::Connect(self.port_display(), "open timed out".to_string())
            })?
            .map_err(|e| PrintError::Connect(self.port_display(), e.to_string()))?;

        // Line feed is literal newline bytes; paper advance is blank lines.
        let mut payload = Vec::new();
        for line in lines {
            payload.extend_from_slice(line.as_bytes());
            payload.push(b'\n');
        }

        let write = async {
            device.write_all(&payload).await?;
            device.flush().await?;
            Ok::<(), std::io::Error>(())
        };
        tokio::time::timeout(self.timeout, write)
            .await
            .map_err(|_| PrintError::Write("write timed out".to_string()))?
            .map_err(|e| PrintError::Write(e.to_string()))?;

        log::debug!(
            "Wrote {} line(s) to {} ({} baud)",
            lines.len(),
            self.port_display(),
            self.baudrate
        );
        Ok(())
    }
}

/// Writes the report to stdout. Infallible in practice, but keeps the sink
/// contract so it can stand in for the printer anywhere.
pub struct ConsoleSink;

#[async_trait]
impl ReportSink for ConsoleSink {
    async fn write_lines(&self, lines: &[String]) -> Result<(), PrintError> {
        let mut stdout = tokio::io::stdout();
        let mut payload = Vec::new();
        for line in lines {
            payload.extend_from_slice(line.as_bytes());
            payload.push(b'\n');
        }
        stdout
            .write_all(&payload)
            .await
            .map_err(|e| PrintError::Write(e.to_string()))?;
        stdout
            .flush()
            .await
            .map_err(|e| PrintError::Write(e.to_string()))?;
        Ok(())
    }
}
