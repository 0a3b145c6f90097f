// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Interface for the periodic tick source driving software timers.

use crate::ErrorCode;

/// A hardware counter raising a periodic interrupt at a fixed,
/// caller-configured period.
///
/// The period is the unit in which every software timer interval is
/// expressed; this interface deliberately knows nothing about
/// wall-clock time.
pub trait TickSource<'a> {
    /// Set the client called on every tick interrupt.
    fn set_client(&self, client: &'a dyn TickClient);

    /// Enable the periodic interrupt.
    ///
    /// Returns `ErrorCode::Already` if the source is already running.
    fn start(&self) -> Result<(), ErrorCode>;

    /// Disable the periodic interrupt.
    ///
    /// The counter configuration is retained, so a later `start`
    /// resumes ticking at the same period. Returns `ErrorCode::Off`
    /// if the source was not running.
    fn stop(&self) -> Result<(), ErrorCode>;

    fn is_running(&self) -> bool;
}

/// Implemented by whoever consumes ticks (the task scheduler).
pub trait TickClient {
    /// Called once per elapsed hardware tick, in interrupt context.
    fn tick(&self);
}
