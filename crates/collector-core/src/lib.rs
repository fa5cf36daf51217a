// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Shared building blocks for telemetry pipeline stages.
//!
//! A pipeline is made of components that receive telemetry batches from an
//! upstream stage and hand them to a downstream [`consumer`]. This crate holds
//! the vocabulary every stage agrees on:
//!
//! - [`component`]: identity, lifecycle and host access
//! - [`consumer`]: the downstream capability and its test doubles
//! - [`processor`]: settings passed to processors at construction
//! - [`pdata`]: the logs, traces and metrics data model
//! - [`telemetry`]: self-instrumentation (metrics level, meter providers)
//! - [`context`]: cancellation context passed through every call

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod component;
pub mod consumer;
pub mod context;
pub mod pdata;
pub mod processor;
pub mod telemetry;

/// Failure signal passed through pipeline stages without being wrapped.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub use context::Context;
