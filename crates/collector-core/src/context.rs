// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Cancellation context threaded through every pipeline call.
//!
//! Stages never interpret the context themselves; they hand the same value to
//! whatever they call next so that the callee can honour cancellation.

use tokio_util::sync::CancellationToken;

/// Execution context for a single pipeline call.
///
/// Cloning a context shares its cancellation state.
#[derive(Debug, Clone, Default)]
pub struct Context {
    token: CancellationToken,
}

impl Context {
    /// Context that is never cancelled unless [`Context::cancel`] is called.
    #[must_use]
    pub fn background() -> Self {
        Self::default()
    }

    /// Derives a child context. Cancelling the parent cancels the child, but
    /// not the other way around.
    #[must_use]
    pub fn with_cancel(&self) -> Self {
        Self {
            token: self.token.child_token(),
        }
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Resolves once the context has been cancelled.
    pub async fn cancelled(&self) {
        self.token.cancelled().await;
    }

    /// Underlying token, for use with `tokio::select!`.
    #[must_use]
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }
}
