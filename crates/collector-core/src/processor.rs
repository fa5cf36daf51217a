// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Processor stages: components that receive a batch, transform it and pass
//! it on to the next consumer.

use crate::component::{BuildInfo, Component, ComponentId};
use crate::consumer::{LogsConsumer, MetricsConsumer, TracesConsumer};
use crate::telemetry::TelemetrySettings;

/// Everything a processor receives at construction besides its own config.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Identifier of this processor instance; attributes its self-telemetry.
    pub id: ComponentId,
    pub telemetry: TelemetrySettings,
    pub build_info: BuildInfo,
}

impl Settings {
    #[must_use]
    pub fn new(id: ComponentId, telemetry: TelemetrySettings) -> Self {
        Self {
            id,
            telemetry,
            build_info: BuildInfo::default(),
        }
    }
}

/// A processor for logs.
pub trait LogsProcessor: Component + LogsConsumer {}

impl<T: Component + LogsConsumer> LogsProcessor for T {}

/// A processor for traces.
pub trait TracesProcessor: Component + TracesConsumer {}

impl<T: Component + TracesConsumer> TracesProcessor for T {}

/// A processor for metrics.
pub trait MetricsProcessor: Component + MetricsConsumer {}

impl<T: Component + MetricsConsumer> MetricsProcessor for T {}
