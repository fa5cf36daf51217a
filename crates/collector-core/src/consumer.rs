// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Downstream consumer capability.
//!
//! A consumer accepts a batch and reports failure by returning an error. The
//! caller owns retries and backpressure; consumers only report what happened.

use async_trait::async_trait;

use crate::pdata::{Logs, Metrics, Traces};
use crate::{BoxError, Context};

/// Describes how a consumer treats the batches it receives.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Whether the consumer may modify the batch in place.
    pub mutates_data: bool,
}

#[async_trait]
pub trait LogsConsumer: Send + Sync {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    async fn consume_logs(&self, ctx: &Context, logs: Logs) -> Result<(), BoxError>;
}

#[async_trait]
pub trait TracesConsumer: Send + Sync {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    async fn consume_traces(&self, ctx: &Context, traces: Traces) -> Result<(), BoxError>;
}

#[async_trait]
pub trait MetricsConsumer: Send + Sync {
    fn capabilities(&self) -> Capabilities {
        Capabilities::default()
    }

    async fn consume_metrics(&self, ctx: &Context, metrics: Metrics) -> Result<(), BoxError>;
}

/// Consumers for tests.
pub mod consumertest {
    use std::sync::{Mutex, PoisonError};

    use async_trait::async_trait;

    use super::{LogsConsumer, MetricsConsumer, TracesConsumer};
    use crate::pdata::{Logs, Metrics, Traces};
    use crate::{BoxError, Context};

    /// Accepts and drops everything.
    #[derive(Debug, Default, Clone, Copy)]
    pub struct NopConsumer;

    #[async_trait]
    impl LogsConsumer for NopConsumer {
        async fn consume_logs(&self, _ctx: &Context, _logs: Logs) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[async_trait]
    impl TracesConsumer for NopConsumer {
        async fn consume_traces(&self, _ctx: &Context, _traces: Traces) -> Result<(), BoxError> {
            Ok(())
        }
    }

    #[async_trait]
    impl MetricsConsumer for NopConsumer {
        async fn consume_metrics(&self, _ctx: &Context, _metrics: Metrics) -> Result<(), BoxError> {
            Ok(())
        }
    }

    /// Error returned by [`ErrConsumer`].
    #[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
    #[error("{0}")]
    pub struct ConsumerTestError(pub String);

    /// Rejects every batch with the same message.
    #[derive(Debug, Clone)]
    pub struct ErrConsumer {
        message: String,
    }

    impl ErrConsumer {
        #[must_use]
        pub fn new(message: impl Into<String>) -> Self {
            Self {
                message: message.into(),
            }
        }

        fn error(&self) -> BoxError {
            Box::new(ConsumerTestError(self.message.clone()))
        }
    }

    #[async_trait]
    impl LogsConsumer for ErrConsumer {
        async fn consume_logs(&self, _ctx: &Context, _logs: Logs) -> Result<(), BoxError> {
            Err(self.error())
        }
    }

    #[async_trait]
    impl TracesConsumer for ErrConsumer {
        async fn consume_traces(&self, _ctx: &Context, _traces: Traces) -> Result<(), BoxError> {
            Err(self.error())
        }
    }

    #[async_trait]
    impl MetricsConsumer for ErrConsumer {
        async fn consume_metrics(&self, _ctx: &Context, _metrics: Metrics) -> Result<(), BoxError> {
            Err(self.error())
        }
    }

    /// Keeps every batch it receives so tests can inspect them.
    #[derive(Debug, Default)]
    pub struct SinkConsumer {
        logs: Mutex<Vec<Logs>>,
        traces: Mutex<Vec<Traces>>,
        metrics: Mutex<Vec<Metrics>>,
        cancelled_on_receipt: Mutex<Vec<bool>>,
    }

    impl SinkConsumer {
        #[must_use]
        pub fn new() -> Self {
            Self::default()
        }

        #[must_use]
        pub fn all_logs(&self) -> Vec<Logs> {
            self.logs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        #[must_use]
        pub fn all_traces(&self) -> Vec<Traces> {
            self.traces
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        #[must_use]
        pub fn all_metrics(&self) -> Vec<Metrics> {
            self.metrics
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        /// Total log records across all received batches.
        #[must_use]
        pub fn log_record_count(&self) -> usize {
            self.logs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(Logs::log_record_count)
                .sum()
        }

        #[must_use]
        pub fn span_count(&self) -> usize {
            self.traces
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(Traces::span_count)
                .sum()
        }

        #[must_use]
        pub fn data_point_count(&self) -> usize {
            self.metrics
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .iter()
                .map(Metrics::data_point_count)
                .sum()
        }

        /// Cancellation state of the context handed to each call, in call
        /// order across all signals.
        #[must_use]
        pub fn cancelled_on_receipt(&self) -> Vec<bool> {
            self.cancelled_on_receipt
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clone()
        }

        fn observe(&self, ctx: &Context) {
            self.cancelled_on_receipt
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(ctx.is_cancelled());
        }

        pub fn reset(&self) {
            self.cancelled_on_receipt
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
            self.logs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
            self.traces
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
            self.metrics
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .clear();
        }
    }

    #[async_trait]
    impl LogsConsumer for SinkConsumer {
        async fn consume_logs(&self, ctx: &Context, logs: Logs) -> Result<(), BoxError> {
            self.observe(ctx);
            self.logs
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(logs);
            Ok(())
        }
    }

    #[async_trait]
    impl TracesConsumer for SinkConsumer {
        async fn consume_traces(&self, ctx: &Context, traces: Traces) -> Result<(), BoxError> {
            self.observe(ctx);
            self.traces
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(traces);
            Ok(())
        }
    }

    #[async_trait]
    impl MetricsConsumer for SinkConsumer {
        async fn consume_metrics(&self, ctx: &Context, metrics: Metrics) -> Result<(), BoxError> {
            self.observe(ctx);
            self.metrics
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(metrics);
            Ok(())
        }
    }
}
