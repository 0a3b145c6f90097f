// Licensed under the Apache License, Version 2.0 or the MIT License.
// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright Tickbus Contributors 2025.

//! Callback-based byte transfers over a raw serial phy.
//!
//! One [`AsyncTransport`] wraps one physical interface and keeps one
//! in-flight transfer per direction. Writes and reads return
//! immediately; the interrupt layer reports hardware activity through
//! [`AsyncTransport::handle_event`], which finalizes the owning
//! channel and signals the client registered for that event. A
//! request issued while its channel is busy is rejected with the
//! buffer handed back, never queued.

use core::cell::Cell;

use tickbus_kernel::hil::serial::{
    self, ErrorClient, Event, ReceiveClient, SerialPhy, TransmitClient,
};
use tickbus_kernel::utilities::cells::{OptionalCell, TakeCell};
use tickbus_kernel::ErrorCode;

/// In-flight transfer state for one direction.
struct Channel {
    buffer: TakeCell<'static, [u8]>,
    len: Cell<usize>,
    position: Cell<usize>,
    busy: Cell<bool>,
}

impl Channel {
    const fn new() -> Channel {
        Channel {
            buffer: TakeCell::empty(),
            len: Cell::new(0),
            position: Cell::new(0),
            busy: Cell::new(false),
        }
    }

    fn begin(&self, buffer: &'static mut [u8], len: usize) {
        self.len.set(len);
        self.position.set(0);
        self.buffer.replace(buffer);
        self.busy.set(true);
    }

    /// Idle the channel, yielding the buffer and the final byte count.
    fn finish(&self) -> Option<(&'static mut [u8], usize)> {
        self.busy.set(false);
        let count = self.position.get();
        self.buffer.take().map(|buffer| (buffer, count))
    }
}

/// An asynchronous transport for one serial-style interface.
pub struct AsyncTransport<'a, P: SerialPhy> {
    phy: &'a P,
    tx: Channel,
    rx: Channel,
    tx_client: OptionalCell<&'a dyn TransmitClient>,
    rx_client: OptionalCell<&'a dyn ReceiveClient>,
    error_client: OptionalCell<&'a dyn ErrorClient>,
}

impl<'a, P: SerialPhy> AsyncTransport<'a, P> {
    pub const fn new(phy: &'a P) -> AsyncTransport<'a, P> {
        AsyncTransport {
            phy,
            tx: Channel::new(),
            rx: Channel::new(),
            tx_client: OptionalCell::empty(),
            rx_client: OptionalCell::empty(),
            error_client: OptionalCell::empty(),
        }
    }

    /// Whether a transmit is outstanding.
    pub fn transmit_busy(&self) -> bool {
        self.tx.busy.get()
    }

    /// Whether a receive is outstanding.
    pub fn receive_busy(&self) -> bool {
        self.rx.busy.get()
    }

    /// Entry point for the interrupt layer. Runs to completion and
    /// dispatches at most one client callback.
    pub fn handle_event(&self, event: Event) {
        match event {
            Event::TransmitComplete => self.transmit_complete(),
            Event::ByteReceived(byte) => self.byte_received(byte),
            Event::ReceiveComplete => {
                // Early termination: the receiver went idle before the
                // requested length arrived.
                if self.rx.busy.get() {
                    self.receive_complete();
                }
            }
            Event::Error(error) => self.receive_error(error),
        }
    }

    fn transmit_complete(&self) {
        if !self.tx.busy.get() {
            // Spurious completion, nothing outstanding.
            return;
        }
        self.tx.position.set(self.tx.len.get());
        if let Some((buffer, count)) = self.tx.finish() {
            self.tx_client
                .map(move |client| client.transmitted_buffer(buffer, count));
        }
    }

    fn byte_received(&self, byte: u8) {
        if !self.rx.busy.get() {
            // No read outstanding; the byte is dropped.
            return;
        }
        let filled = self
            .rx
            .buffer
            .map(|buffer| {
                let position = self.rx.position.get();
                buffer[position] = byte;
                self.rx.position.set(position + 1);
                position + 1 >= self.rx.len.get()
            })
            .unwrap_or(false);
        if filled {
            self.receive_complete();
        }
    }

    fn receive_complete(&self) {
        self.phy.disable_receive();
        if let Some((buffer, count)) = self.rx.finish() {
            self.rx_client
                .map(move |client| client.received_buffer(buffer, count));
        }
    }

    fn receive_error(&self, error: serial::Error) {
        if !self.rx.busy.get() {
            return;
        }
        self.phy.disable_receive();
        if let Some((buffer, count)) = self.rx.finish() {
            self.error_client
                .map(move |client| client.transfer_error(error, buffer, count));
        }
    }
}

impl<'a, P: SerialPhy> serial::Transmit<'a> for AsyncTransport<'a, P> {
    fn set_transmit_client(&self, client: &'a dyn TransmitClient) {
        self.tx_client.set(client);
    }

    fn transmit_buffer(
        &self,
        tx_buffer: &'static mut [u8],
        tx_len: usize,
    ) -> Result<(), (ErrorCode, &'static mut [u8])> {
        if tx_len == 0 || tx_len > tx_buffer.len() {
            return Err((ErrorCode::Size, tx_buffer));
        }
        critical_section::with(|_| {
            if self.tx.busy.get() {
                return Err((ErrorCode::Busy, tx_buffer));
            }
            self.phy.start_transmit(&tx_buffer[..tx_len]);
            self.tx.begin(tx_buffer, tx_len);
            Ok(())
        })
    }
}

impl<'a, P: SerialPhy> serial::Receive<'a> for AsyncTransport<'a, P> {
    fn set_receive_client(&self, client: &'a dyn ReceiveClient) {
        self.rx_client.set(client);
    }

    fn set_error_client(&self, client: &'a dyn ErrorClient) {
        self.error_client.set(client);
    }

    fn receive_buffer(
        &self,
        rx_buffer: &'static mut [u8],
        rx_len: usize,
    ) -> Result<(), (ErrorCode, &'static mut [u8])> {
        if rx_len == 0 || rx_len > rx_buffer.len() {
            return Err((ErrorCode::Size, rx_buffer));
        }
        critical_section::with(|_| {
            if self.rx.busy.get() {
                return Err((ErrorCode::Busy, rx_buffer));
            }
            self.rx.begin(rx_buffer, rx_len);
            self.phy.enable_receive();
            Ok(())
        })
    }
}

#[cfg(test)]
mod test {
    use super::AsyncTransport;
    use std::cell::{Cell, RefCell};
    use tickbus_kernel::hil::serial::{
        Error, ErrorClient, Event, Receive, ReceiveClient, SerialPhy, Transmit, TransmitClient,
    };
    use tickbus_kernel::utilities::cells::TakeCell;
    use tickbus_kernel::ErrorCode;

    #[derive(Default)]
    struct MockPhy {
        wire: RefCell<Vec<u8>>,
        receiving: Cell<bool>,
    }

    impl SerialPhy for MockPhy {
        fn start_transmit(&self, data: &[u8]) {
            self.wire.borrow_mut().extend_from_slice(data);
        }

        fn enable_receive(&self) {
            self.receiving.set(true);
        }

        fn disable_receive(&self) {
            self.receiving.set(false);
        }
    }

    #[derive(Default)]
    struct TxRecorder {
        buffer: TakeCell<'static, [u8]>,
        len: Cell<Option<usize>>,
    }

    impl TransmitClient for TxRecorder {
        fn transmitted_buffer(&self, tx_buffer: &'static mut [u8], tx_len: usize) {
            self.buffer.replace(tx_buffer);
            self.len.set(Some(tx_len));
        }
    }

    #[derive(Default)]
    struct RxRecorder {
        buffer: TakeCell<'static, [u8]>,
        len: Cell<Option<usize>>,
    }

    impl ReceiveClient for RxRecorder {
        fn received_buffer(&self, rx_buffer: &'static mut [u8], rx_len: usize) {
            self.buffer.replace(rx_buffer);
            self.len.set(Some(rx_len));
        }
    }

    #[derive(Default)]
    struct ErrorRecorder {
        cause: Cell<Option<Error>>,
        buffer: TakeCell<'static, [u8]>,
        len: Cell<Option<usize>>,
    }

    impl ErrorClient for ErrorRecorder {
        fn transfer_error(&self, error: Error, rx_buffer: &'static mut [u8], rx_len: usize) {
            self.cause.set(Some(error));
            self.buffer.replace(rx_buffer);
            self.len.set(Some(rx_len));
        }
    }

    fn transport() -> (
        &'static AsyncTransport<'static, MockPhy>,
        &'static MockPhy,
        &'static TxRecorder,
        &'static RxRecorder,
        &'static ErrorRecorder,
    ) {
        let phy = &*Box::leak(Box::new(MockPhy::default()));
        let transport = &*Box::leak(Box::new(AsyncTransport::new(phy)));
        let tx_client = &*Box::leak(Box::new(TxRecorder::default()));
        let rx_client = &*Box::leak(Box::new(RxRecorder::default()));
        let error_client = &*Box::leak(Box::new(ErrorRecorder::default()));
        transport.set_transmit_client(tx_client);
        transport.set_receive_client(rx_client);
        transport.set_error_client(error_client);
        (transport, phy, tx_client, rx_client, error_client)
    }

    fn static_buffer(contents: &[u8]) -> &'static mut [u8] {
        Box::leak(contents.to_vec().into_boxed_slice())
    }

    #[test]
    fn write_while_busy_rejected_until_completion() {
        let (transport, phy, tx_client, _, _) = transport();

        transport
            .transmit_buffer(static_buffer(b"hello world!"), 12)
            .unwrap();
        assert_eq!(&*phy.wire.borrow(), b"hello world!");
        assert!(transport.transmit_busy());

        // Second write before completion: rejected, buffer handed
        // back, in-flight transfer untouched.
        let (code, rejected) = transport
            .transmit_buffer(static_buffer(b"again"), 5)
            .unwrap_err();
        assert_eq!(code, ErrorCode::Busy);
        assert_eq!(rejected, b"again");
        assert_eq!(&*phy.wire.borrow(), b"hello world!");

        transport.handle_event(Event::TransmitComplete);
        assert_eq!(tx_client.len.get(), Some(12));
        assert!(!transport.transmit_busy());

        transport.transmit_buffer(static_buffer(b"again"), 5).unwrap();
        assert_eq!(&*phy.wire.borrow(), b"hello world!again");
    }

    #[test]
    fn transmit_length_validated() {
        let (transport, _, _, _, _) = transport();
        let (code, _) = transport
            .transmit_buffer(static_buffer(b"abc"), 4)
            .unwrap_err();
        assert_eq!(code, ErrorCode::Size);
        let (code, _) = transport
            .transmit_buffer(static_buffer(b"abc"), 0)
            .unwrap_err();
        assert_eq!(code, ErrorCode::Size);
    }

    #[test]
    fn receive_completes_at_requested_length() {
        let (transport, phy, _, rx_client, _) = transport();

        transport.receive_buffer(static_buffer(&[0; 8]), 4).unwrap();
        assert!(phy.receiving.get());

        for byte in [0x10, 0x20, 0x30] {
            transport.handle_event(Event::ByteReceived(byte));
        }
        assert!(rx_client.len.get().is_none());

        transport.handle_event(Event::ByteReceived(0x40));
        assert_eq!(rx_client.len.get(), Some(4));
        assert!(!phy.receiving.get());
        assert!(!transport.receive_busy());
        rx_client.buffer.map(|buffer| {
            assert_eq!(&buffer[..4], &[0x10, 0x20, 0x30, 0x40]);
        });
    }

    #[test]
    fn receive_reports_partial_count_on_idle() {
        let (transport, _, _, rx_client, _) = transport();

        transport.receive_buffer(static_buffer(&[0; 8]), 8).unwrap();
        transport.handle_event(Event::ByteReceived(0xaa));
        transport.handle_event(Event::ByteReceived(0xbb));
        transport.handle_event(Event::ReceiveComplete);

        // Early termination: count is what actually arrived.
        assert_eq!(rx_client.len.get(), Some(2));
    }

    #[test]
    fn error_mid_receive_idles_channel_and_reports_cause() {
        let (transport, _, _, rx_client, error_client) = transport();

        transport.receive_buffer(static_buffer(&[0; 4]), 4).unwrap();
        transport.handle_event(Event::ByteReceived(0x01));
        transport.handle_event(Event::Error(Error::Overrun));

        assert_eq!(error_client.cause.get(), Some(Error::Overrun));
        assert_eq!(error_client.len.get(), Some(1));
        assert!(rx_client.len.get().is_none());
        assert!(!transport.receive_busy());

        // The channel is reusable after the fault.
        transport.receive_buffer(static_buffer(&[0; 4]), 4).unwrap();
        assert!(transport.receive_busy());
    }

    #[test]
    fn spurious_events_are_ignored() {
        let (transport, _, tx_client, rx_client, error_client) = transport();

        transport.handle_event(Event::TransmitComplete);
        transport.handle_event(Event::ByteReceived(0xff));
        transport.handle_event(Event::ReceiveComplete);
        transport.handle_event(Event::Error(Error::Framing));

        assert!(tx_client.len.get().is_none());
        assert!(rx_client.len.get().is_none());
        assert!(error_client.cause.get().is_none());
    }

    #[test]
    fn receive_while_busy_rejected() {
        let (transport, _, _, _, _) = transport();

        transport.receive_buffer(static_buffer(&[0; 4]), 4).unwrap();
        let (code, _) = transport
            .receive_buffer(static_buffer(&[0; 4]), 4)
            .unwrap_err();
        assert_eq!(code, ErrorCode::Busy);
    }
}
