// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Interfaces between the runtime drivers and the hardware layer.
//!
//! Each module pairs a downward-facing trait (what a driver asks the
//! hardware to do) with client traits (how completion is signaled
//! back). All completion flows through clients; none of these
//! interfaces block.

pub mod can;
pub mod serial;
pub mod time;
