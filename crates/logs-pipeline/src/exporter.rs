// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use async_trait::async_trait;
use collector_core::consumer::{Capabilities, LogsConsumer};
use collector_core::pdata::Logs;
use collector_core::{BoxError, Context};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;
use tracing::trace;

/// Writes every batch it receives as one JSON line.
#[derive(Debug)]
pub struct JsonLinesExporter<W> {
    writer: Mutex<W>,
}

impl<W> JsonLinesExporter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }
}

#[async_trait]
impl<W> LogsConsumer for JsonLinesExporter<W>
where
    W: AsyncWrite + Unpin + Send,
{
    fn capabilities(&self) -> Capabilities {
        Capabilities {
            mutates_data: false,
        }
    }

    async fn consume_logs(&self, _ctx: &Context, logs: Logs) -> Result<(), BoxError> {
        let mut line = serde_json::to_vec(&logs)?;
        line.push(b'\n');

        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        writer.flush().await?;
        trace!("Exported {} log records", logs.log_record_count());
        Ok(())
    }
}
