// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Standard error enum for invoking operations.

/// Errors returned synchronously by the registration surface.
///
/// Transfer-time hardware faults are not represented here; those are
/// delivered asynchronously through the error client the caller
/// registered for that purpose.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ErrorCode {
    /// A transfer is already outstanding on this channel; retry
    Busy,
    /// The fixed table has no free entry left
    CapacityExceeded,
    /// Slot index is out of range for the filter table
    InvalidSlot,
    /// Handle does not name a currently registered task
    InvalidTask,
    /// A parameter was outside the accepted range
    Size,
    /// The requested state is already set
    Already,
    /// The component is not running
    Off,
}
