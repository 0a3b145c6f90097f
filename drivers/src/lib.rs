// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Interrupt-driven peripheral drivers for the tickbus runtime.
//!
//! Three drivers share one dispatch discipline: state registered from
//! the main context, hardware events delivered in interrupt context,
//! and completion signaled synchronously through the client registered
//! for that event.
//!
//! - [`timer::TaskScheduler`] multiplexes periodic and one-shot tasks
//!   onto a single hardware tick source.
//! - [`serial::AsyncTransport`] runs callback-based byte transfers
//!   over a raw serial phy.
//! - [`can::CanFilterEngine`] accepts or drops incoming frames by
//!   id/mask filter slots and dispatches the survivors.
//!
//! Registration-surface mutations are guarded by brief critical
//! sections so an interrupt handler never observes a half-updated
//! table.

#![cfg_attr(not(test), no_std)]

pub mod can;
pub mod serial;
pub mod timer;
