// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

use std::process;

use collector_core::telemetry::InMemoryMeterProvider;
use collector_core::Context;
use logs_pipeline::config::PipelineConfig;
use logs_pipeline::pipeline;
use tracing::{debug, error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
pub async fn main() {
    let config = PipelineConfig::from_env();
    let log_level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "info".to_string());

    // Logs go to stderr so stdout carries only exported batches.
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(
            EnvFilter::try_new(&log_level).unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .without_time()
        .finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set global tracing subscriber: {e}");
    }

    let config = match config {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    };
    debug!("Starting logs pipeline with {:?}", config);

    let ctx = Context::background();
    let signal_ctx = ctx.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received interrupt, draining pipeline");
            signal_ctx.cancel();
        }
    });

    let provider = InMemoryMeterProvider::new();
    match pipeline::run(
        &ctx,
        &config,
        tokio::io::stdin(),
        tokio::io::stdout(),
        provider,
    )
    .await
    {
        Ok(summary) => info!(
            "Processor {} finished: {} batches, {} malformed lines, {} failed batches, {} items in, {} items out",
            config.processor_id,
            summary.batches,
            summary.malformed_lines,
            summary.failed_batches,
            summary.incoming_items,
            summary.outgoing_items
        ),
        Err(e) => {
            error!("Logs pipeline failed: {}", e);
            process::exit(1);
        }
    }
}
