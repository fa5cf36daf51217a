// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Optional behaviour shared by every processor the helper builds.

use std::fmt;
use std::sync::Arc;

use collector_core::component::Host;
use collector_core::consumer::Capabilities;
use collector_core::{BoxError, Context};

pub type StartFunc = Arc<dyn Fn(&Context, &dyn Host) -> Result<(), BoxError> + Send + Sync>;

pub type ShutdownFunc = Arc<dyn Fn(&Context) -> Result<(), BoxError> + Send + Sync>;

/// Optional lifecycle hooks and capabilities.
///
/// Unset hooks succeed without doing anything. Unset capabilities default to
/// `mutates_data = true`, since a processing function receives the batch by
/// value and may change it.
#[derive(Clone, Default)]
pub struct ProcessorOptions {
    pub start: Option<StartFunc>,
    pub shutdown: Option<ShutdownFunc>,
    pub capabilities: Option<Capabilities>,
}

impl ProcessorOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_start<F>(mut self, start: F) -> Self
    where
        F: Fn(&Context, &dyn Host) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.start = Some(Arc::new(start));
        self
    }

    #[must_use]
    pub fn with_shutdown<F>(mut self, shutdown: F) -> Self
    where
        F: Fn(&Context) -> Result<(), BoxError> + Send + Sync + 'static,
    {
        self.shutdown = Some(Arc::new(shutdown));
        self
    }

    #[must_use]
    pub fn with_capabilities(mut self, capabilities: Capabilities) -> Self {
        self.capabilities = Some(capabilities);
        self
    }
}

impl fmt::Debug for ProcessorOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProcessorOptions")
            .field("start", &self.start.is_some())
            .field("shutdown", &self.shutdown.is_some())
            .field("capabilities", &self.capabilities)
            .finish()
    }
}

/// Resolved options, held by each processor.
pub(crate) struct Lifecycle {
    start: Option<StartFunc>,
    shutdown: Option<ShutdownFunc>,
    capabilities: Capabilities,
}

impl Lifecycle {
    pub(crate) fn new(options: ProcessorOptions) -> Self {
        Self {
            start: options.start,
            shutdown: options.shutdown,
            capabilities: options.capabilities.unwrap_or(Capabilities { mutates_data: true }),
        }
    }

    pub(crate) fn start(&self, ctx: &Context, host: &dyn Host) -> Result<(), BoxError> {
        match &self.start {
            Some(start) => start(ctx, host),
            None => Ok(()),
        }
    }

    pub(crate) fn shutdown(&self, ctx: &Context) -> Result<(), BoxError> {
        match &self.shutdown {
            Some(shutdown) => shutdown(ctx),
            None => Ok(()),
        }
    }

    pub(crate) fn capabilities(&self) -> Capabilities {
        self.capabilities
    }
}
