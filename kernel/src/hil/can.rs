// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Interfaces for frame-oriented (CAN-style) buses.

use crate::ErrorCode;

/// Payload capacity of a classic CAN data frame.
pub const STANDARD_CAN_PACKET_SIZE: usize = 8;
/// Payload capacity of an FD-style data frame.
pub const FD_CAN_PACKET_SIZE: usize = 64;

/// The identifier can be standard (11 bits) or extended (29 bits).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Id {
    Standard(u16),
    Extended(u32),
}

impl Id {
    /// The identifier bits, regardless of format.
    pub fn raw(&self) -> u32 {
        match *self {
            Id::Standard(id) => id as u32,
            Id::Extended(id) => id,
        }
    }

    pub fn is_extended(&self) -> bool {
        matches!(self, Id::Extended(_))
    }
}

/// Data frames carry a payload; remote frames request one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FrameType {
    Data,
    Remote,
}

/// Bus faults reported for a failed transmission.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A higher-priority frame won the bus; the transmission was
    /// abandoned
    ArbitrationLost,
    /// No receiver acknowledged the frame
    Ack,
    /// The transmit error counter overflowed and the controller left
    /// the bus
    BusOff,
}

/// One frame as it crosses the hardware boundary.
///
/// `PACKET_SIZE` is [`STANDARD_CAN_PACKET_SIZE`] for classic framing
/// or [`FD_CAN_PACKET_SIZE`] for FD-style framing.
#[derive(Copy, Clone, Debug)]
pub struct Frame<const PACKET_SIZE: usize> {
    pub id: Id,
    pub frame_type: FrameType,
    /// Number of valid bytes in `data`, at most `PACKET_SIZE`.
    pub len: usize,
    pub data: [u8; PACKET_SIZE],
}

/// Hardware activity reported by the interrupt layer. The hardware
/// supplies raw frame contents and fault causes but performs no
/// filtering or interpretation.
#[derive(Copy, Clone, Debug)]
pub enum Event<const PACKET_SIZE: usize> {
    /// The outstanding transmission reached the bus and was
    /// acknowledged.
    TransmitComplete,
    /// The outstanding transmission failed.
    TransmitError(Error),
    /// A frame arrived, unfiltered.
    FrameReceived(Frame<PACKET_SIZE>),
}

/// Transmit mailbox underneath a filter engine.
pub trait CanPhy<const PACKET_SIZE: usize> {
    /// Hand one frame to the hardware transmit mailbox. Completion is
    /// reported later through [`Event::TransmitComplete`] or
    /// [`Event::TransmitError`].
    fn start_transmit(&self, frame: &Frame<PACKET_SIZE>);
}

/// Configuration surface for the acceptance-filter table.
pub trait Filter {
    /// Write `slot` and mark it enabled. The identifier format is
    /// carried by the `Id` variant; `mask` selects the identifier
    /// bits to ignore during comparison (0 requires an exact match).
    ///
    /// Fails with `ErrorCode::InvalidSlot` if `slot` is out of range.
    fn set_filter(&self, slot: usize, id: Id, mask: u32) -> Result<(), ErrorCode>;

    /// Disable `slot`. Fails with `ErrorCode::InvalidSlot` if `slot`
    /// is out of range.
    fn clear_filter(&self, slot: usize) -> Result<(), ErrorCode>;

    /// Number of filter slots the engine provides.
    fn filter_count(&self) -> usize;
}

/// Transmit half of the bus registration surface.
pub trait Transmit<'a, const PACKET_SIZE: usize> {
    /// Set the client called when a transmission resolves. Replaces
    /// any previously registered client.
    fn set_transmit_client(&self, client: &'a dyn TransmitClient);

    /// Hand `frame` to the hardware, non-blocking.
    ///
    /// Fails with `ErrorCode::Busy` while a transmission is
    /// outstanding (rejected, not queued) and `ErrorCode::Size` if
    /// `frame.len` exceeds `PACKET_SIZE`.
    fn send(&self, frame: &Frame<PACKET_SIZE>) -> Result<(), ErrorCode>;
}

/// Receive half of the bus registration surface.
pub trait Receive<'a> {
    /// Set the client receiving accepted frames. Replaces any
    /// previously registered client.
    fn set_receive_client(&self, client: &'a dyn ReceiveClient);
}

/// Implemented by clients of [`Transmit`].
pub trait TransmitClient {
    /// The outstanding transmission resolved, successfully or not.
    fn transmit_complete(&self, status: Result<(), Error>);
}

/// Implemented by clients of [`Receive`].
pub trait ReceiveClient {
    /// A frame matched an enabled filter slot. `data` borrows the
    /// engine's scratch buffer and is only valid for the duration of
    /// the call; clients that keep the payload must copy it out.
    fn frame_received(&self, id: Id, frame_type: FrameType, data: &mut [u8], len: usize);
}
