// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Acceptance filtering and transmit sequencing for a CAN-style bus.
//!
//! The hardware delivers every frame on the wire; [`CanFilterEngine`]
//! decides which ones the client sees. Each of the `FILTERS` slots
//! holds an identifier, a mask of identifier bits to ignore, and the
//! identifier format. An incoming frame is checked against enabled
//! slots in index order and dispatched on the first match; a frame
//! matching no slot is dropped without notice, which is normal
//! filtering rather than a fault.
//!
//! The transmit path holds one outstanding frame. [`send`] while a
//! transmission is pending is rejected with `Busy`, never queued.
//!
//! [`send`]: tickbus_kernel::hil::can::Transmit::send

use core::cell::Cell;

use tickbus_kernel::hil::can::{
    self, CanPhy, Event, Frame, FrameType, Id, ReceiveClient, TransmitClient,
};
use tickbus_kernel::utilities::cells::{OptionalCell, TakeCell};
use tickbus_kernel::ErrorCode;

/// One acceptance-filter slot. Disabled slots hold no configuration.
struct FilterSlot {
    /// Identifier and mask while enabled. The `Id` variant carries the
    /// format; a frame in the other format never matches.
    config: Cell<Option<(Id, u32)>>,
}

impl FilterSlot {
    const EMPTY: FilterSlot = FilterSlot {
        config: Cell::new(None),
    };

    fn matches(&self, id: Id) -> bool {
        match self.config.get() {
            Some((slot_id, mask)) => {
                slot_id.is_extended() == id.is_extended()
                    && (id.raw() & !mask) == (slot_id.raw() & !mask)
            }
            None => false,
        }
    }
}

/// Filter table and transmit mailbox front-end for one bus interface.
pub struct CanFilterEngine<'a, P: CanPhy<PACKET_SIZE>, const PACKET_SIZE: usize, const FILTERS: usize>
{
    phy: &'a P,
    filters: [FilterSlot; FILTERS],
    tx_busy: Cell<bool>,
    /// Scratch the accepted payload is copied into before dispatch, so
    /// the client borrow never points into the transient event.
    rx_buffer: TakeCell<'static, [u8]>,
    tx_client: OptionalCell<&'a dyn TransmitClient>,
    rx_client: OptionalCell<&'a dyn ReceiveClient>,
}

impl<'a, P: CanPhy<PACKET_SIZE>, const PACKET_SIZE: usize, const FILTERS: usize>
    CanFilterEngine<'a, P, PACKET_SIZE, FILTERS>
{
    /// `rx_buffer` must hold at least `PACKET_SIZE` bytes.
    pub const fn new(
        phy: &'a P,
        rx_buffer: &'static mut [u8],
    ) -> CanFilterEngine<'a, P, PACKET_SIZE, FILTERS> {
        CanFilterEngine {
            phy,
            filters: [FilterSlot::EMPTY; FILTERS],
            tx_busy: Cell::new(false),
            rx_buffer: TakeCell::new(rx_buffer),
            tx_client: OptionalCell::empty(),
            rx_client: OptionalCell::empty(),
        }
    }

    /// Whether a transmission is outstanding.
    pub fn transmit_busy(&self) -> bool {
        self.tx_busy.get()
    }

    /// Entry point for the interrupt layer. Runs to completion and
    /// dispatches at most one client callback.
    pub fn handle_event(&self, event: Event<PACKET_SIZE>) {
        match event {
            Event::TransmitComplete => self.transmit_resolved(Ok(())),
            Event::TransmitError(error) => self.transmit_resolved(Err(error)),
            Event::FrameReceived(frame) => self.frame_received(&frame),
        }
    }

    fn transmit_resolved(&self, status: Result<(), can::Error>) {
        if !self.tx_busy.get() {
            // Spurious completion, nothing outstanding.
            return;
        }
        self.tx_busy.set(false);
        self.tx_client.map(|client| client.transmit_complete(status));
    }

    fn frame_received(&self, frame: &Frame<PACKET_SIZE>) {
        if !self.filters.iter().any(|slot| slot.matches(frame.id)) {
            return;
        }
        let len = frame.len.min(PACKET_SIZE);
        self.rx_buffer.map(|buffer| {
            if buffer.len() >= len {
                buffer[..len].copy_from_slice(&frame.data[..len]);
                self.rx_client.map(|client| {
                    client.frame_received(frame.id, frame.frame_type, &mut buffer[..len], len)
                });
            }
        });
    }
}

impl<'a, P: CanPhy<PACKET_SIZE>, const PACKET_SIZE: usize, const FILTERS: usize> can::Filter
    for CanFilterEngine<'a, P, PACKET_SIZE, FILTERS>
{
    fn set_filter(&self, slot: usize, id: Id, mask: u32) -> Result<(), ErrorCode> {
        let entry = self.filters.get(slot).ok_or(ErrorCode::InvalidSlot)?;
        critical_section::with(|_| entry.config.set(Some((id, mask))));
        Ok(())
    }

    fn clear_filter(&self, slot: usize) -> Result<(), ErrorCode> {
        let entry = self.filters.get(slot).ok_or(ErrorCode::InvalidSlot)?;
        critical_section::with(|_| entry.config.set(None));
        Ok(())
    }

    fn filter_count(&self) -> usize {
        FILTERS
    }
}

impl<'a, P: CanPhy<PACKET_SIZE>, const PACKET_SIZE: usize, const FILTERS: usize>
    can::Transmit<'a, PACKET_SIZE> for CanFilterEngine<'a, P, PACKET_SIZE, FILTERS>
{
    fn set_transmit_client(&self, client: &'a dyn TransmitClient) {
        self.tx_client.set(client);
    }

    fn send(&self, frame: &Frame<PACKET_SIZE>) -> Result<(), ErrorCode> {
        if frame.len > PACKET_SIZE {
            return Err(ErrorCode::Size);
        }
        critical_section::with(|_| {
            if self.tx_busy.get() {
                return Err(ErrorCode::Busy);
            }
            self.tx_busy.set(true);
            self.phy.start_transmit(frame);
            Ok(())
        })
    }
}

impl<'a, P: CanPhy<PACKET_SIZE>, const PACKET_SIZE: usize, const FILTERS: usize> can::Receive<'a>
    for CanFilterEngine<'a, P, PACKET_SIZE, FILTERS>
{
    fn set_receive_client(&self, client: &'a dyn ReceiveClient) {
        self.rx_client.set(client);
    }
}
