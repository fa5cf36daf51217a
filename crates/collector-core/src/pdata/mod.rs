// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Telemetry data model shared by pipeline stages.
//!
//! All three signals follow the same nesting:
//!
//! ```text
//!   batch
//!     └─ resource (who emitted it)
//!          └─ instrumentation scope (which library emitted it)
//!               └─ items (log records, spans or metrics)
//! ```
//!
//! The JSON representation follows the OTLP/JSON field names so batches can be
//! read from and written to newline-delimited files.

pub mod logs;
pub mod metrics;
pub mod traces;

use serde::{Deserialize, Serialize};

pub use logs::{LogRecord, Logs, ResourceLogs, ScopeLogs};
pub use metrics::{
    AggregationTemporality, HistogramDataPoint, Metric, MetricData, Metrics, NumberDataPoint,
    ResourceMetrics, ScopeMetrics,
};
pub use traces::{ResourceSpans, ScopeSpans, Span, SpanKind, Traces};

/// A dynamically typed attribute or body value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnyValue {
    StringValue(String),
    BoolValue(bool),
    IntValue(i64),
    DoubleValue(f64),
    ArrayValue(Vec<AnyValue>),
    KvlistValue(Vec<KeyValue>),
    BytesValue(Vec<u8>),
}

impl From<&str> for AnyValue {
    fn from(value: &str) -> Self {
        AnyValue::StringValue(value.to_string())
    }
}

impl From<String> for AnyValue {
    fn from(value: String) -> Self {
        AnyValue::StringValue(value)
    }
}

impl From<bool> for AnyValue {
    fn from(value: bool) -> Self {
        AnyValue::BoolValue(value)
    }
}

impl From<i64> for AnyValue {
    fn from(value: i64) -> Self {
        AnyValue::IntValue(value)
    }
}

impl From<f64> for AnyValue {
    fn from(value: f64) -> Self {
        AnyValue::DoubleValue(value)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeyValue {
    pub key: String,
    pub value: AnyValue,
}

impl KeyValue {
    pub fn new(key: impl Into<String>, value: impl Into<AnyValue>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Looks up the first attribute with the given key.
#[must_use]
pub fn find_attribute<'a>(attributes: &'a [KeyValue], key: &str) -> Option<&'a AnyValue> {
    attributes.iter().find(|kv| kv.key == key).map(|kv| &kv.value)
}

/// Entity that produced the telemetry, e.g. a host or a service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Resource {
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
}

/// Library that produced the telemetry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct InstrumentationScope {
    pub name: String,
    pub version: String,
    pub attributes: Vec<KeyValue>,
}

/// Appends `item` and hands back a mutable reference to it.
fn push_last<T>(items: &mut Vec<T>, item: T) -> &mut T {
    items.push(item);
    match items.last_mut() {
        Some(last) => last,
        None => unreachable!("vector is non-empty after push"),
    }
}
