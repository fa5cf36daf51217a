// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Settings for building processors in tests.

use collector_core::component::{ComponentId, Type};
use collector_core::processor::Settings;
use collector_core::telemetry::TelemetrySettings;

/// Type used by [`nop_settings`].
pub const NOP_TYPE: &str = "nop";

/// Settings with id `nop` and self-telemetry disabled.
#[must_use]
pub fn nop_settings() -> Settings {
    nop_settings_with_type(Type::must_new(NOP_TYPE))
}

#[must_use]
pub fn nop_settings_with_type(ty: Type) -> Settings {
    Settings::new(ComponentId::new(ty), TelemetrySettings::nop())
}
