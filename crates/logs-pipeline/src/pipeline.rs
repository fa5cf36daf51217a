// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use collector_core::component::{Component, Host};
use collector_core::consumer::LogsConsumer;
use collector_core::pdata::Logs;
use collector_core::processor::Settings;
use collector_core::telemetry::{AttributeSet, InMemoryMeterProvider, TelemetrySettings};
use collector_core::{BoxError, Context};
use processorhelper::obsreport::{INCOMING_ITEMS_METRIC, OUTGOING_ITEMS_METRIC, PROCESSOR_KEY};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, BufReader};
use tracing::{debug, warn};

use crate::config::PipelineConfig;
use crate::exporter::JsonLinesExporter;
use crate::filter::{new_severity_filter, SeverityFilterConfig};

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("failed to build processor: {0}")]
    Build(BoxError),
    #[error("failed to start processor: {0}")]
    Start(BoxError),
    #[error("failed to shut down processor: {0}")]
    Shutdown(BoxError),
    #[error("failed to read input: {0}")]
    Io(#[from] std::io::Error),
}

/// What a single run of the pipeline did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub batches: usize,
    pub malformed_lines: usize,
    pub failed_batches: usize,
    /// Processor counter totals, zero when self-telemetry is disabled.
    pub incoming_items: u64,
    pub outgoing_items: u64,
}

struct PipelineHost;

impl Host for PipelineHost {}

/// Runs `input` through the severity filter into `output` until EOF or
/// until `ctx` is cancelled.
///
/// Each non-blank input line holds one JSON encoded [`Logs`] batch. Lines
/// that fail to decode are logged and skipped.
pub async fn run<R, W>(
    ctx: &Context,
    config: &PipelineConfig,
    input: R,
    output: W,
    provider: InMemoryMeterProvider,
) -> Result<RunSummary, PipelineError>
where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let settings = Settings::new(
        config.processor_id.clone(),
        TelemetrySettings::with_provider(config.metrics_level, Arc::new(provider.clone())),
    );
    let exporter = Arc::new(JsonLinesExporter::new(output));
    let processor = new_severity_filter(
        ctx,
        settings,
        SeverityFilterConfig {
            min_severity: config.min_severity,
        },
        exporter,
    )
    .map_err(PipelineError::Build)?;

    processor
        .start(ctx, &PipelineHost)
        .await
        .map_err(PipelineError::Start)?;

    let mut summary = RunSummary::default();
    let read_result = consume_lines(ctx, &processor, input, &mut summary).await;

    processor
        .shutdown(ctx)
        .await
        .map_err(PipelineError::Shutdown)?;
    read_result?;

    let attributes = AttributeSet::new([(PROCESSOR_KEY, config.processor_id.to_string())]);
    for scope in provider.collect() {
        if let Some(sum) = scope.metric(INCOMING_ITEMS_METRIC) {
            summary.incoming_items += sum.value_for(&attributes).unwrap_or(0);
        }
        if let Some(sum) = scope.metric(OUTGOING_ITEMS_METRIC) {
            summary.outgoing_items += sum.value_for(&attributes).unwrap_or(0);
        }
    }

    Ok(summary)
}

/// Feeds every line of `input` to `processor` until EOF or cancellation.
/// Only a failing reader ends the loop with an error.
async fn consume_lines<R, C>(
    ctx: &Context,
    processor: &C,
    input: R,
    summary: &mut RunSummary,
) -> std::io::Result<()>
where
    R: AsyncRead + Unpin,
    C: LogsConsumer,
{
    let mut reader = BufReader::new(input);
    let mut buf = Vec::new();
    let mut line_number = 0usize;

    loop {
        buf.clear();
        let read = tokio::select! {
            () = ctx.cancelled() => {
                debug!("Pipeline cancelled after {} lines", line_number);
                return Ok(());
            }
            read = reader.read_until(b'\n', &mut buf) => read?,
        };
        if read == 0 {
            return Ok(());
        }
        line_number += 1;

        if buf.iter().all(u8::is_ascii_whitespace) {
            continue;
        }

        // from_slice also rejects lines that are not valid UTF-8
        let logs = match serde_json::from_slice::<Logs>(&buf) {
            Ok(logs) => logs,
            Err(e) => {
                warn!("Skipping malformed batch on line {}: {}", line_number, e);
                summary.malformed_lines += 1;
                continue;
            }
        };

        summary.batches += 1;
        if let Err(e) = processor.consume_logs(ctx, logs).await {
            warn!("Failed to process batch on line {}: {}", line_number, e);
            summary.failed_batches += 1;
        }
    }
}
