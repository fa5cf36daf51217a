// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Metrics processor built from a plain processing function. Items are data
//! points, not metric streams.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use collector_core::component::{Component, ComponentId, Config, Host};
use collector_core::consumer::{Capabilities, MetricsConsumer};
use collector_core::pdata::Metrics;
use collector_core::processor::Settings;
use collector_core::{BoxError, Context};
use tracing::debug;

use crate::error::{Error, ProcessError};
use crate::obsreport::ObsReport;
use crate::options::{Lifecycle, ProcessorOptions};

pub type ProcessMetricsFunc =
    Arc<dyn Fn(&Context, Metrics) -> Result<Metrics, ProcessError> + Send + Sync>;

pub fn process_metrics_fn<F>(f: F) -> ProcessMetricsFunc
where
    F: Fn(&Context, Metrics) -> Result<Metrics, ProcessError> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// A metrics pipeline stage around a [`ProcessMetricsFunc`].
pub struct MetricsProcessorAdapter {
    id: ComponentId,
    config: Arc<dyn Config>,
    lifecycle: Lifecycle,
    process: ProcessMetricsFunc,
    next: Arc<dyn MetricsConsumer>,
    obsreport: ObsReport,
}

impl MetricsProcessorAdapter {
    /// # Errors
    ///
    /// Returns [`Error::MissingProcessFunc`] when `process` is `None`.
    pub fn new(
        _ctx: &Context,
        settings: Settings,
        config: Arc<dyn Config>,
        next: Arc<dyn MetricsConsumer>,
        process: Option<ProcessMetricsFunc>,
        options: ProcessorOptions,
    ) -> Result<Self, Error> {
        let process = process.ok_or(Error::MissingProcessFunc)?;
        let obsreport = ObsReport::new(&settings);
        debug!("Created metrics processor {}", settings.id);

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

impl fmt::Debug for MetricsProcessorAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MetricsProcessorAdapter")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("capabilities", &self.lifecycle.capabilities())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Component for MetricsProcessorAdapter {
    async fn start(&self, ctx: &Context, host: &dyn Host) -> Result<(), BoxError> {
        self.lifecycle.start(ctx, host)
    }

    async fn shutdown(&self, ctx: &Context) -> Result<(), BoxError> {
        self.lifecycle.shutdown(ctx)
    }
}

#[async_trait]
impl MetricsConsumer for MetricsProcessorAdapter {
    fn capabilities(&self) -> Capabilities {
        self.lifecycle.capabilities()
    }

    async fn consume_metrics(&self, ctx: &Context, metrics: Metrics) -> Result<(), BoxError> {
        let incoming = metrics.data_point_count();
        let metrics = match (self.process)(ctx, metrics) {
            Ok(metrics) => metrics,
            Err(ProcessError::SkipProcessingData) => return Ok(()),
            Err(ProcessError::Other(err)) => return Err(err),
        };

        self.obsreport.record_in_out(incoming, metrics.data_point_count());
        self.next.consume_metrics(ctx, metrics).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    use collector_core::component::componenttest::{NopConfig, NopHost};
    use collector_core::consumer::consumertest::{NopConsumer, SinkConsumer};
    use collector_core::pdata::{MetricData, NumberDataPoint};
    use collector_core::telemetry::{AttributeSet, InMemoryMeterProvider, Level, TelemetrySettings};

    use super::*;
    use crate::obsreport::{INCOMING_ITEMS_METRIC, OUTGOING_ITEMS_METRIC, PROCESSOR_KEY};
    use crate::processortest;

    #[derive(Debug, PartialEq, thiserror::Error)]
    #[error("my_error")]
    struct MyError;

    fn build(
        next: Arc<dyn MetricsConsumer>,
        process: Option<ProcessMetricsFunc>,
        options: ProcessorOptions,
    ) -> Result<MetricsProcessorAdapter, Error> {
        MetricsProcessorAdapter::new(
            &Context::background(),
            processortest::nop_settings(),
            Arc::new(NopConfig),
            next,
            process,
            options,
        )
    }

    fn gauge_with_points(n: usize) -> Metrics {
        let mut metrics = Metrics::new();
        metrics
            .append_resource_metrics()
            .append_scope_metrics()
            .append_metric(
                "queue.size",
                MetricData::Gauge {
                    data_points: vec![NumberDataPoint::default(); n],
                },
            );
        metrics
    }

    #[tokio::test]
    async fn test_new_metrics_processor() {
        let mp = build(
            Arc::new(NopConsumer),
            Some(process_metrics_fn(|_, metrics| Ok(metrics))),
            ProcessorOptions::default(),
        )
        .unwrap();
        let ctx = Context::background();

        assert!(mp.capabilities().mutates_data);
        assert!(mp.start(&ctx, &NopHost).await.is_ok());
        assert!(mp.consume_metrics(&ctx, Metrics::new()).await.is_ok());
        assert!(mp.shutdown(&ctx).await.is_ok());
    }

    #[test]
    fn test_new_metrics_processor_nil_required_fields() {
        let err = build(Arc::new(NopConsumer), None, ProcessorOptions::default()).unwrap_err();
        assert_eq!(err, Error::MissingProcessFunc);
    }

    #[tokio::test]
    async fn test_new_metrics_processor_with_options() {
        let mp = build(
            Arc::new(NopConsumer),
            Some(process_metrics_fn(|_, metrics| Ok(metrics))),
            ProcessorOptions::new()
                .with_start(|_, _| Err(MyError.into()))
                .with_shutdown(|_| Err(MyError.into()))
                .with_capabilities(Capabilities {
                    mutates_data: false,
                }),
        )
        .unwrap();
        let ctx = Context::background();

        let err = mp.start(&ctx, &NopHost).await.unwrap_err();
        assert_eq!(err.downcast_ref::<MyError>(), Some(&MyError));
        let err = mp.shutdown(&ctx).await.unwrap_err();
        assert_eq!(err.downcast_ref::<MyError>(), Some(&MyError));
        assert!(!mp.capabilities().mutates_data);
    }

    #[tokio::test]
    async fn test_process_metrics_error_and_skip() {
        let sink = Arc::new(SinkConsumer::new());
        let failing = build(
            sink.clone(),
            Some(process_metrics_fn(|_, _| Err(ProcessError::other(MyError)))),
            ProcessorOptions::default(),
        )
        .unwrap();
        let skipping = build(
            sink.clone(),
            Some(process_metrics_fn(|_, _| Err(ProcessError::SkipProcessingData))),
            ProcessorOptions::default(),
        )
        .unwrap();
        let ctx = Context::background();

        let err = failing
            .consume_metrics(&ctx, gauge_with_points(2))
            .await
            .unwrap_err();
        assert_eq!(err.downcast_ref::<MyError>(), Some(&MyError));
        assert!(skipping
            .consume_metrics(&ctx, gauge_with_points(2))
            .await
            .is_ok());
        assert!(sink.all_metrics().is_empty());
    }

    #[tokio::test]
    async fn test_counts_data_points() {
        let provider = InMemoryMeterProvider::new();
        let mut settings = processortest::nop_settings();
        settings.telemetry =
            TelemetrySettings::with_provider(Level::Basic, Arc::new(provider.clone()));
        let sink = Arc::new(SinkConsumer::new());

        let mp = MetricsProcessorAdapter::new(
            &Context::background(),
            settings,
            Arc::new(NopConfig),
            sink.clone(),
            Some(process_metrics_fn(|_, _| Ok(gauge_with_points(1)))),
            ProcessorOptions::default(),
        )
        .unwrap();

        mp.consume_metrics(&Context::background(), gauge_with_points(5))
            .await
            .unwrap();

        let attributes = AttributeSet::new([(PROCESSOR_KEY, "nop")]);
        let scopes = provider.collect();
        let incoming = scopes[0].metric(INCOMING_ITEMS_METRIC).unwrap();
        let outgoing = scopes[0].metric(OUTGOING_ITEMS_METRIC).unwrap();
        assert_eq!(incoming.value_for(&attributes), Some(5));
        assert_eq!(outgoing.value_for(&attributes), Some(1));
        assert_eq!(sink.data_point_count(), 1);
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
            Some(process_metrics_fn(|_, metrics| Ok(metrics))),
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
        processor.consume_metrics(&live, gauge_with_points(1)).await.unwrap();
        processor.consume_metrics(&cancelled, gauge_with_points(1)).await.unwrap();
        processor.shutdown(&cancelled).await.unwrap();

        assert!(start_saw_cancel.load(Ordering::SeqCst));
        assert!(shutdown_saw_cancel.load(Ordering::SeqCst));
        assert_eq!(sink.cancelled_on_receipt(), vec![false, true]);
    }
}
