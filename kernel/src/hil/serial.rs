// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Interfaces for asynchronous byte-stream transports.
//!
//! A transport driver sits between callers issuing non-blocking
//! writes/reads and a [`SerialPhy`] that moves the actual bytes. The
//! interrupt layer feeds hardware activity to the driver as [`Event`]s;
//! the driver finalizes the in-flight transfer and signals the client
//! registered for that event.

use crate::ErrorCode;

/// The type of receive-path fault encountered during a transfer.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// A byte arrived before the previous one was read out
    Overrun,
    /// A stop bit was sampled at the wrong level
    Framing,
    /// The parity bit did not match the received data
    Parity,
}

/// Hardware activity reported by the interrupt layer for one physical
/// interface. The hardware performs no interpretation; it only
/// supplies raw bytes and fault causes.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// The last byte of the outstanding transmit left the hardware.
    TransmitComplete,
    /// The hardware latched one received byte.
    ByteReceived(u8),
    /// The receiver went idle before the outstanding read filled its
    /// buffer.
    ReceiveComplete,
    /// A receive-path fault occurred.
    Error(Error),
}

/// Raw transmit/receive machinery underneath a transport driver.
pub trait SerialPhy {
    /// Begin pushing `data` onto the wire. The phy latches the bytes
    /// before returning; completion is reported later through
    /// [`Event::TransmitComplete`].
    fn start_transmit(&self, data: &[u8]);

    /// Enable the receiver. Incoming bytes are reported through
    /// [`Event::ByteReceived`].
    fn enable_receive(&self);

    /// Disable the receiver. Bytes arriving while disabled are lost.
    fn disable_receive(&self);
}

/// Transmit half of a transport's registration surface.
pub trait Transmit<'a> {
    /// Set the client called when a transmit completes. Replaces any
    /// previously registered client.
    fn set_transmit_client(&self, client: &'a dyn TransmitClient);

    /// Transmit `tx_len` bytes from `tx_buffer`, non-blocking.
    ///
    /// The buffer moves into the driver until the completion callback
    /// returns it. Fails with `(ErrorCode::Busy, tx_buffer)` while a
    /// transmit is outstanding (the request is rejected, not queued)
    /// and `(ErrorCode::Size, tx_buffer)` if `tx_len` exceeds the
    /// buffer.
    fn transmit_buffer(
        &self,
        tx_buffer: &'static mut [u8],
        tx_len: usize,
    ) -> Result<(), (ErrorCode, &'static mut [u8])>;
}

/// Receive half of a transport's registration surface.
pub trait Receive<'a> {
    /// Set the client called when a receive completes. Replaces any
    /// previously registered client.
    fn set_receive_client(&self, client: &'a dyn ReceiveClient);

    /// Set the client called on a receive-path fault. Replaces any
    /// previously registered client.
    fn set_error_client(&self, client: &'a dyn ErrorClient);

    /// Receive up to `rx_len` bytes into `rx_buffer`, non-blocking.
    ///
    /// Same ownership and failure contract as
    /// [`Transmit::transmit_buffer`].
    fn receive_buffer(
        &self,
        rx_buffer: &'static mut [u8],
        rx_len: usize,
    ) -> Result<(), (ErrorCode, &'static mut [u8])>;
}

/// Implemented by clients of [`Transmit`].
pub trait TransmitClient {
    /// The outstanding transmit finished; `tx_buffer` is handed back.
    fn transmitted_buffer(&self, tx_buffer: &'static mut [u8], tx_len: usize);
}

/// Implemented by clients of [`Receive`].
pub trait ReceiveClient {
    /// The outstanding receive finished. `rx_len` is the number of
    /// bytes actually received, which may be less than requested when
    /// the receiver went idle early.
    fn received_buffer(&self, rx_buffer: &'static mut [u8], rx_len: usize);
}

/// Implemented by clients interested in receive-path faults.
pub trait ErrorClient {
    /// A fault ended the outstanding receive. `rx_buffer` holds the
    /// `rx_len` bytes that arrived before the fault.
    fn transfer_error(&self, error: Error, rx_buffer: &'static mut [u8], rx_len: usize);
}
