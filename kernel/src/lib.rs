// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Core abstractions for the tickbus interrupt-driven peripheral runtime.
//!
//! This crate defines the hardware-interface traits (`hil`) that the
//! drivers in `tickbus-drivers` virtualize over, the standard
//! [`ErrorCode`] returned by every registration-surface operation, and
//! the cell types used to share driver state between the main context
//! and interrupt handlers.
//!
//! Nothing in this crate blocks. Hardware raises events through the
//! `hil` client traits; drivers run each handler to completion and
//! signal their own clients in turn.

#![cfg_attr(not(test), no_std)]

pub mod errorcode;
pub mod hil;
pub mod utilities;

pub use errorcode::ErrorCode;
