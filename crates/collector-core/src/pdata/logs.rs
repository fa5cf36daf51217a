// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::{Deserialize, Serialize};

use super::{push_last, AnyValue, InstrumentationScope, KeyValue, Resource};

/// A batch of log records grouped by resource and scope.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Logs {
    pub resource_logs: Vec<ResourceLogs>,
}

impl Logs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an empty resource grouping and returns it for filling.
    pub fn append_resource_logs(&mut self) -> &mut ResourceLogs {
        push_last(&mut self.resource_logs, ResourceLogs::default())
    }

    /// Number of log records across every resource and scope.
    #[must_use]
    pub fn log_record_count(&self) -> usize {
        self.resource_logs
            .iter()
            .flat_map(|rl| rl.scope_logs.iter())
            .map(|sl| sl.log_records.len())
            .sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log_record_count() == 0
    }

    /// Iterates over every record in batch order.
    pub fn log_records(&self) -> impl Iterator<Item = &LogRecord> {
        self.resource_logs
            .iter()
            .flat_map(|rl| rl.scope_logs.iter())
            .flat_map(|sl| sl.log_records.iter())
    }

    /// Keeps only the records for which `keep` returns true, then drops
    /// scope and resource groupings left without records.
    pub fn retain_log_records<F>(&mut self, mut keep: F)
    where
        F: FnMut(&LogRecord) -> bool,
    {
        for rl in &mut self.resource_logs {
            for sl in &mut rl.scope_logs {
                sl.log_records.retain(&mut keep);
            }
            rl.scope_logs.retain(|sl| !sl.log_records.is_empty());
        }
        self.resource_logs.retain(|rl| !rl.scope_logs.is_empty());
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ResourceLogs {
    pub resource: Resource,
    pub scope_logs: Vec<ScopeLogs>,
    pub schema_url: String,
}

impl ResourceLogs {
    pub fn append_scope_logs(&mut self) -> &mut ScopeLogs {
        push_last(&mut self.scope_logs, ScopeLogs::default())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ScopeLogs {
    pub scope: InstrumentationScope,
    pub log_records: Vec<LogRecord>,
    pub schema_url: String,
}

impl ScopeLogs {
    pub fn append_log_record(&mut self) -> &mut LogRecord {
        push_last(&mut self.log_records, LogRecord::default())
    }
}

/// A single log entry.
///
/// `severity_number` follows the OTLP scale: 1-4 trace, 5-8 debug, 9-12 info,
/// 13-16 warn, 17-20 error, 21-24 fatal, 0 unspecified.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LogRecord {
    pub time_unix_nano: u64,
    pub observed_time_unix_nano: u64,
    pub severity_number: i32,
    pub severity_text: String,
    pub body: Option<AnyValue>,
    pub attributes: Vec<KeyValue>,
    pub dropped_attributes_count: u32,
    pub flags: u32,
    pub trace_id: String,
    pub span_id: String,
}
