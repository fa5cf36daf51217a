// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Items-in/items-out instrumentation shared by every helper-built processor.

use std::sync::Arc;

use collector_core::processor::Settings;
use collector_core::telemetry::{AttributeSet, Counter, InstrumentDescriptor, Level, NoopCounter};
use tracing::{debug, trace};

/// Instrumentation scope of the processor counters.
pub const SCOPE_NAME: &str = "processorhelper";

pub const INCOMING_ITEMS_METRIC: &str = "otelcol_processor_incoming_items";
pub const OUTGOING_ITEMS_METRIC: &str = "otelcol_processor_outgoing_items";

/// Attribute key identifying the processor instance on every data point.
pub const PROCESSOR_KEY: &str = "processor";

const ITEMS_UNIT: &str = "{items}";

/// Counts items entering and leaving a processor.
pub struct ObsReport {
    incoming: Arc<dyn Counter>,
    outgoing: Arc<dyn Counter>,
    attributes: AttributeSet,
}

impl ObsReport {
    /// Registers the counters when basic-level metrics are enabled, otherwise
    /// builds a report that records nothing.
    #[must_use]
    pub fn new(settings: &Settings) -> Self {
        let attributes = AttributeSet::new([(PROCESSOR_KEY, settings.id.to_string())]);

        let Some(meter) = settings.telemetry.leveled_meter(Level::Basic, SCOPE_NAME) else {
            trace!(
                "Self-telemetry disabled for processor {} (metrics level {})",
                settings.id,
                settings.telemetry.metrics_level
            );
            return Self {
                incoming: Arc::new(NoopCounter),
                outgoing: Arc::new(NoopCounter),
                attributes,
            };
        };

        debug!("Registering item counters for processor {}", settings.id);
        Self {
            incoming: meter.u64_counter(InstrumentDescriptor::new(
                INCOMING_ITEMS_METRIC,
                "Number of items passed to the processor.",
                ITEMS_UNIT,
            )),
            outgoing: meter.u64_counter(InstrumentDescriptor::new(
                OUTGOING_ITEMS_METRIC,
                "Number of items emitted from the processor.",
                ITEMS_UNIT,
            )),
            attributes,
        }
    }

    pub fn record_in_out(&self, incoming: usize, outgoing: usize) {
        self.incoming.add(incoming as u64, &self.attributes);
        self.outgoing.add(outgoing as u64, &self.attributes);
    }
}
