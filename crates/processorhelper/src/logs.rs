// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Logs processor built from a plain processing function.
//!
//! ```text
//!   consume_logs(batch)
//!         │
//!         v
//!   ┌──────────────┐   SkipProcessingData ──> Ok(()), nothing forwarded
//!   │ process_fn   │── Other(err) ─────────> Err(err), nothing forwarded
//!   └──────┬───────┘
//!          │ Ok(batch')
//!          v
//!   record items in (batch) / out (batch')
//!          │
//!          v
//!   next.consume_logs(batch') ──> result returned as is
//! ```

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use collector_core::component::{Component, ComponentId, Config, Host};
use collector_core::consumer::{Capabilities, LogsConsumer};
use collector_core::pdata::Logs;
use collector_core::processor::Settings;
use collector_core::{BoxError, Context};
use tracing::debug;

use crate::error::{Error, ProcessError};
use crate::obsreport::ObsReport;
use crate::options::{Lifecycle, ProcessorOptions};

/// Transforms a logs batch. May return the input, a modified input, or an
/// entirely new batch.
pub type ProcessLogsFunc = Arc<dyn Fn(&Context, Logs) -> Result<Logs, ProcessError> + Send + Sync>;

/// Wraps a closure into a [`ProcessLogsFunc`], letting the compiler infer the
/// closure's argument types.
pub fn process_logs_fn<F>(f: F) -> ProcessLogsFunc
where
    F: Fn(&Context, Logs) -> Result<Logs, ProcessError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A logs pipeline stage around a [`ProcessLogsFunc`].
pub struct LogsProcessorAdapter {
    id: ComponentId,
    config: Arc<dyn Config>,
    lifecycle: Lifecycle,
    process: ProcessLogsFunc,
    next: Arc<dyn LogsConsumer>,
    obsreport: ObsReport,
}

impl LogsProcessorAdapter {
    /// Builds a processor that runs `process` on every batch and hands the
    /// result to `next`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingProcessFunc`] when `process` is `None`.
    pub fn new(
        _ctx: &Context,
        settings: Settings,
        config: Arc<dyn Config>,
        next: Arc<dyn LogsConsumer>,
        process: Option<ProcessLogsFunc>,
        options: ProcessorOptions,
    ) -> Result<Self, Error> {
        let process = process.ok_or(Error::MissingProcessFunc)?;
        let obsreport = ObsReport::new(&settings);
        debug!("Created logs processor {}", settings.id);

        Ok(Self {
            id: settings.id,
            config,
            lifecycle: Lifecycle::new(options),
            process,
            next,
            obsreport,
        })
    }

    #[must_use]
    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    /// Configuration the processor was built with. Never interpreted here.
    #[must_use]
    pub fn config(&self) -> &dyn Config {
        self.config.as_ref()
    }
}

impl fmt::Debug for LogsProcessorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogsProcessorAdapter")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("capabilities", &self.lifecycle.capabilities())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Component for LogsProcessorAdapter {
    async fn start(&self, ctx: &Context, host: &dyn Host) -> Result<(), BoxError> {
        self.lifecycle.start(ctx, host)
    }

    async fn shutdown(&self, ctx: &Context) -> Result<(), BoxError> {
        self.lifecycle.shutdown(ctx)
    }
}

#[async_trait]
impl LogsConsumer for LogsProcessorAdapter {
    fn capabilities(&self) -> Capabilities {
        self.lifecycle.capabilities()
    }

    async fn consume_logs(&self, ctx: &Context, logs: Logs) -> Result<(), BoxError> {
        let incoming = logs.log_record_count();
        let logs = match (self.process)(ctx, logs) {
            Ok(logs) => logs,
            Err(ProcessError::SkipProcessingData) => return Ok(()),
            Err(ProcessError::Other(err)) => return Err(err),
        };

        // Counted before delivery: a downstream failure still shows up here.
        self.obsreport.record_in_out(incoming, logs.log_record_count());
        self.next.consume_logs(ctx, logs).await
    }
}
