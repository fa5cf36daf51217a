// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use super::{push_last, InstrumentationScope, KeyValue, Resource};

/// A batch of metrics grouped by resource and scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Metrics {
    pub resource_metrics: Vec<ResourceMetrics>,
}

impl Metrics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_resource_metrics(&mut self) -> &mut ResourceMetrics {
        push_last(&mut self.resource_metrics, ResourceMetrics::default())
    }

    fn iter_metrics(&self) -> impl Iterator<Item = &Metric> {
        self.resource_metrics
            .iter()
            .flat_map(|rm| rm.scope_metrics.iter())
            .flat_map(|sm| sm.metrics.iter())
    }

    /// Number of metric streams, regardless of how many points they carry.
    #[must_use]
    pub fn metric_count(&self) -> usize {
        self.iter_metrics().count()
    }

    /// Number of data points across every metric. This is the item count
    /// pipeline stages report for metrics.
    #[must_use]
    pub fn data_point_count(&self) -> usize {
        self.iter_metrics().map(|m| m.data.data_point_count()).sum()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceMetrics {
    pub resource: Resource,
    pub scope_metrics: Vec<ScopeMetrics>,
    pub schema_url: String,
}

impl ResourceMetrics {
    pub fn append_scope_metrics(&mut self) -> &mut ScopeMetrics {
        push_last(&mut self.scope_metrics, ScopeMetrics::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScopeMetrics {
    pub scope: InstrumentationScope,
    pub metrics: Vec<Metric>,
    pub schema_url: String,
}

impl ScopeMetrics {
    pub fn append_metric(&mut self, name: impl Into<String>, data: MetricData) -> &mut Metric {
        push_last(
            &mut self.metrics,
            Metric {
                name: name.into(),
                description: String::new(),
                unit: String::new(),
                data,
            },
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metric {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub unit: String,
    #[serde(flatten)]
    pub data: MetricData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum AggregationTemporality {
    #[default]
    Unspecified,
    Delta,
    Cumulative,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MetricData {
    Gauge {
        data_points: Vec<NumberDataPoint>,
    },
    #[serde(rename_all = "camelCase")]
    Sum {
        data_points: Vec<NumberDataPoint>,
        aggregation_temporality: AggregationTemporality,
        is_monotonic: bool,
    },
    #[serde(rename_all = "camelCase")]
    Histogram {
        data_points: Vec<HistogramDataPoint>,
        aggregation_temporality: AggregationTemporality,
    },
}

impl MetricData {
    #[must_use]
    pub fn data_point_count(&self) -> usize {
        match self {
            MetricData::Gauge { data_points } | MetricData::Sum { data_points, .. } => {
                data_points.len()
            }
            MetricData::Histogram { data_points, .. } => data_points.len(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NumberDataPoint {
    pub attributes: Vec<KeyValue>,
    pub start_time_unix_nano: u64,
    pub time_unix_nano: u64,
    pub value: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HistogramDataPoint {
    pub attributes: Vec<KeyValue>,
    pub start_time_unix_nano: u64,
    pub time_unix_nano: u64,
    pub count: u64,
    pub sum: Option<f64>,
    pub bucket_counts: Vec<u64>,
    pub explicit_bounds: Vec<f64>,
}
