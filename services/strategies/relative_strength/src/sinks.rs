//! Signal sinks
//!
//! Push delivery (ntfy and friends) lives outside this workspace. These sinks
//! log signals and notifications or append them to a JSON-lines file for
//! downstream pickup. Titles already carry their emoji.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;
use tracing::info;

use strengthscan_strategy_shared::SignalSink;
use strengthscan_types::{Notification, Signal};

/// Writes every signal to the log
#[derive(Debug, Default)]
pub struct LogSink;

#[async_trait]
impl SignalSink for LogSink {
    fn name(&self) -> &str {
        "log"
    }

    async fn deliver(&self, signals: &[Signal]) -> Result<()> {
        for signal in signals {
            info!(
                "{} [{}] {} | confidence {:.0}%",
                signal.title(),
                signal.priority().as_str(),
                signal.pair().opportunity_type,
                signal.confidence() * 100.0
            );
        }
        Ok(())
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        info!(
            "{} [{}]\n{}",
            notification.title(),
            notification.priority().as_str(),
            notification.message()
        );
        Ok(())
    }
}

/// Appends one JSON object per signal to a file
pub struct JsonlFileSink {
    path: PathBuf,
}

impl JsonlFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    async fn append(&self, buffer: &str) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .with_context(|| format!("Failed to open signal file {:?}", self.path))?;
        file.write_all(buffer.as_bytes())
            .await
            .with_context(|| format!("Failed to write signal file {:?}", self.path))?;
        file.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl SignalSink for JsonlFileSink {
    fn name(&self) -> &str {
        "jsonl_file"
    }

    async fn deliver(&self, signals: &[Signal]) -> Result<()> {
        if signals.is_empty() {
            return Ok(());
        }

        let mut buffer = String::new();
        for signal in signals {
            buffer.push_str(&serde_json::to_string(signal).context("Failed to encode signal")?);
            buffer.push('\n');
        }
        self.append(&buffer).await
    }

    async fn notify(&self, notification: &Notification) -> Result<()> {
        let mut line =
            serde_json::to_string(notification).context("Failed to encode notification")?;
        line.push('\n');
        self.append(&line).await
    }
}
