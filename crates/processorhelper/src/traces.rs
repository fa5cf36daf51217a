// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Traces processor built from a plain processing function. Items are spans.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use collector_core::component::{Component, ComponentId, Config, Host};
use collector_core::consumer::{Capabilities, TracesConsumer};
use collector_core::pdata::Traces;
use collector_core::processor::Settings;
use collector_core::{BoxError, Context};
use tracing::debug;

use crate::error::{Error, ProcessError};
use crate::obsreport::ObsReport;
use crate::options::{Lifecycle, ProcessorOptions};

pub type ProcessTracesFunc =
    Arc<dyn Fn(&Context, Traces) -> Result<Traces, ProcessError> + Send + Sync>;

pub fn process_traces_fn<F>(f: F) -> ProcessTracesFunc
where
    F: Fn(&Context, Traces) -> Result<Traces, ProcessError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A traces pipeline stage around a [`ProcessTracesFunc`].
pub struct TracesProcessorAdapter {
    id: ComponentId,
    config: Arc<dyn Config>,
    lifecycle: Lifecycle,
    process: ProcessTracesFunc,
    next: Arc<dyn TracesConsumer>,
    obsreport: ObsReport,
}

impl TracesProcessorAdapter {
    /// # Errors
    ///
    /// Returns [`Error::MissingProcessFunc`] when `process` is `None`.
    pub fn new(
        _ctx: &Context,
        settings: Settings,
        config: Arc<dyn Config>,
        next: Arc<dyn TracesConsumer>,
        process: Option<ProcessTracesFunc>,
        options: ProcessorOptions,
    ) -> Result<Self, Error> {
        let process = process.ok_or(Error::MissingProcessFunc)?;
        let obsreport = ObsReport::new(&settings);
        debug!("Created traces processor {}", settings.id);

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

    #[must_use]
    pub fn config(&self) -> &dyn Config {
        self.config.as_ref()
    }
}

impl fmt::Debug for TracesProcessorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TracesProcessorAdapter")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("capabilities", &self.lifecycle.capabilities())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Component for TracesProcessorAdapter {
    async fn start(&self, ctx: &Context, host: &dyn Host) -> Result<(), BoxError> {
        self.lifecycle.start(ctx, host)
    }

    async fn shutdown(&self, ctx: &Context) -> Result<(), BoxError> {
        self.lifecycle.shutdown(ctx)
    }
}

#[async_trait]
impl TracesConsumer for TracesProcessorAdapter {
    fn capabilities(&self) -> Capabilities {
        self.lifecycle.capabilities()
    }

    async fn consume_traces(&self, ctx: &Context, traces: Traces) -> Result<(), BoxError> {
        let incoming = traces.span_count();
        let traces = match (self.process)(ctx, traces) {
            Ok(traces) => traces,
            Err(ProcessError::SkipProcessingData) => return Ok(()),
            Err(ProcessError::Other(err)) => return Err(err),
        };

        self.obsreport.record_in_out(incoming, traces.span_count());
        self.next.consume_traces(ctx, traces).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};

    use collector_core::component::componenttest::{NopConfig, NopHost};
    use collector_core::consumer::consumertest::{NopConsumer, SinkConsumer};

    use super::*;
    use crate::processortest;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("my_error")]
    struct MyError;

    fn build(
        next: Arc<dyn TracesConsumer>,
        process: Option<ProcessTracesFunc>,
        options: ProcessorOptions,
    ) -> Result<TracesProcessorAdapter, Error> {
        TracesProcessorAdapter::new(
            &Context::background(),
            processortest::nop_settings(),
            Arc::new(NopConfig),
            next,
            process,
            options,
        )
    }

    fn traces_with_spans(n: usize) -> Traces {
        let mut traces = Traces::new();
        let ss = traces.append_resource_spans().append_scope_spans();
        for _ in 0..n {
            ss.append_span();
        }
        traces
    }

    #[tokio::test]
    async fn test_new_traces_processor() {
        let tp = build(
            Arc::new(NopConsumer),
            Some(process_traces_fn(|_, traces| Ok(traces))),
            ProcessorOptions::default(),
        )
        .unwrap();
        let ctx = Context::background();

        assert!(tp.capabilities().mutates_data);
        assert!(tp.start(&ctx, &NopHost).await.is_ok());
        assert!(tp.consume_traces(&ctx, Traces::new()).await.is_ok());
        assert!(tp.shutdown(&ctx).await.is_ok());
    }

    #[tokio::test]
    async fn test_new_traces_processor_with_options() {
        let tp = build(
            Arc::new(NopConsumer),
            Some(process_traces_fn(|_, traces| Ok(traces))),
            ProcessorOptions::new()
                .with_start(|_, _| Err(MyError.into()))
                .with_shutdown(|_| Err(MyError.into()))
                .with_capabilities(Capabilities {
                    mutates_data: false,
                }),
        )
        .unwrap();
        let ctx = Context::background();

        let err = tp.start(&ctx, &NopHost).await.unwrap_err();
        assert_eq!(err.downcast_ref::<MyError>(), Some(&MyError));
        let err = tp.shutdown(&ctx).await.unwrap_err();
        assert_eq!(err.downcast_ref::<MyError>(), Some(&MyError));
        assert!(!tp.capabilities().mutates_data);
    }

    #[test]
    fn test_new_traces_processor_nil_required_fields() {
        let err = build(Arc::new(NopConsumer), None, ProcessorOptions::default()).unwrap_err();
        assert_eq!(err, Error::MissingProcessFunc);
    }

    #[tokio::test]
    async fn test_new_traces_processor_process_traces_error() {
        let sink = Arc::new(SinkConsumer::new());
        let tp = build(
            sink.clone(),
            Some(process_traces_fn(|_, _| Err(ProcessError::other(MyError)))),
            ProcessorOptions::default(),
        )
        .unwrap();

        let err = tp
            .consume_traces(&Context::background(), traces_with_spans(1))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<MyError>(), Some(&MyError));
        assert!(sink.all_traces().is_empty());
    }

    #[tokio::test]
    async fn test_new_traces_processor_skip() {
        let sink = Arc::new(SinkConsumer::new());
        let tp = build(
            sink.clone(),
            Some(process_traces_fn(|_, _| Err(ProcessError::SkipProcessingData))),
            ProcessorOptions::default(),
        )
        .unwrap();

        assert!(tp
            .consume_traces(&Context::background(), traces_with_spans(1))
            .await
            .is_ok());
        assert!(sink.all_traces().is_empty());
    }

    #[tokio::test]
    async fn test_forwards_to_next() {
        let sink = Arc::new(SinkConsumer::new());
        let tp = build(
            sink.clone(),
            Some(process_traces_fn(|_, traces| Ok(traces))),
            ProcessorOptions::default(),
        )
        .unwrap();

        tp.consume_traces(&Context::background(), traces_with_spans(3))
            .await
            .unwrap();
        assert_eq!(sink.span_count(), 3);
    }
    #[tokio::test]
    async fn test_context_reaches_hooks_and_next() {
        let start_saw_cancel = Arc::new(AtomicBool::new(false));
        let shutdown_saw_cancel = Arc::new(AtomicBool::new(false));
        let sink = Arc::new(SinkConsumer::new());

        let started = start_saw_cancel.clone();
        let stopped = shutdown_saw_cancel.clone();
        let processor = build(
            sink.clone(),
            Some(process_traces_fn(|_, traces| Ok(traces))),
            ProcessorOptions::new()
                .with_start(move |ctx, _| {
                    started.store(ctx.is_cancelled(), Ordering::SeqCst);
                    Ok(())
                })
                .with_shutdown(move |ctx| {
                    stopped.store(ctx.is_cancelled(), Ordering::SeqCst);
                    Ok(())
                }),
        )
        .unwrap();

        let live = Context::background();
        let cancelled = Context::background();
        cancelled.cancel();

        processor.start(&cancelled, &NopHost).await.unwrap();
        processor.consume_traces(&live, traces_with_spans(1)).await.unwrap();
        processor.consume_traces(&cancelled, traces_with_spans(1)).await.unwrap();
        processor.shutdown(&cancelled).await.unwrap();

        assert!(start_saw_cancel.load(Ordering::SeqCst));
        assert!(shutdown_saw_cancel.load(Ordering::SeqCst));
        assert_eq!(sink.cancelled_on_receipt(), vec![false, true]);
    }
}
