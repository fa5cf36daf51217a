// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Builds pipeline processors out of plain processing functions.
//!
//! Most processors only need to transform a batch. This crate supplies the
//! rest: optional lifecycle hooks, capabilities, and the items-in/items-out
//! counters every processor is expected to report.
//!
//! ```rust,ignore
//! use processorhelper::{process_logs_fn, LogsProcessorAdapter, ProcessError, ProcessorOptions};
//!
//! let processor = LogsProcessorAdapter::new(
//!     &ctx,
//!     settings,
//!     Arc::new(config),
//!     next,
//!     Some(process_logs_fn(|_ctx, mut logs| {
//!         logs.retain_log_records(|r| r.severity_number >= 13);
//!         if logs.is_empty() {
//!             return Err(ProcessError::SkipProcessingData);
//!         }
//!         Ok(logs)
//!     })),
//!     ProcessorOptions::default(),
//! )?;
//! ```

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod error;
pub mod logs;
pub mod metrics;
pub mod obsreport;
pub mod options;
pub mod processortest;
pub mod traces;

pub use error::{Error, ProcessError};
pub use logs::{process_logs_fn, LogsProcessorAdapter, ProcessLogsFunc};
pub use metrics::{process_metrics_fn, MetricsProcessorAdapter, ProcessMetricsFunc};
pub use options::{ProcessorOptions, ShutdownFunc, StartFunc};
pub use traces::{process_traces_fn, ProcessTracesFunc, TracesProcessorAdapter};
