// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;

use collector_core::component::Config;
use collector_core::consumer::LogsConsumer;
use collector_core::pdata::Logs;
use collector_core::processor::Settings;
use collector_core::{BoxError, Context};
use processorhelper::{process_logs_fn, LogsProcessorAdapter, ProcessError, ProcessorOptions};
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeverityFilterConfig {
    pub min_severity: i32,
}

impl Config for SeverityFilterConfig {
    fn validate(&self) -> Result<(), BoxError> {
        if self.min_severity < 0 {
            return Err(format!(
                "min_severity must not be negative, got {}",
                self.min_severity
            )
            .into());
        }
        Ok(())
    }
}

/// Drops records below `min_severity`. An emptied batch is skipped rather
/// than forwarded.
pub fn filter_by_severity(min_severity: i32, mut logs: Logs) -> Result<Logs, ProcessError> {
    let before = logs.log_record_count();
    logs.retain_log_records(|record| record.severity_number >= min_severity);

    if logs.is_empty() {
        debug!("Dropped all {} log records below severity {}", before, min_severity);
        return Err(ProcessError::SkipProcessingData);
    }
    Ok(logs)
}

pub fn new_severity_filter(
    ctx: &Context,
    settings: Settings,
    config: SeverityFilterConfig,
    next: Arc<dyn LogsConsumer>,
) -> Result<LogsProcessorAdapter, BoxError> {
    config.validate()?;

    let min_severity = config.min_severity;
    let id = settings.id.clone();
    let options = ProcessorOptions::new()
        .with_start(move |_ctx, _host| {
            info!("Severity filter {} keeps records at or above {}", id, min_severity);
            Ok(())
        })
        .with_shutdown(|_ctx| {
            debug!("Severity filter stopped");
            Ok(())
        });

    let processor = LogsProcessorAdapter::new(
        ctx,
        settings,
        Arc::new(config),
        next,
        Some(process_logs_fn(move |_ctx, logs| {
            filter_by_severity(min_severity, logs)
        })),
        options,
    )?;
    Ok(processor)
}
