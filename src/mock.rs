//! Recording endpoint substrate and critical section for unit tests.

extern crate std;

use core::cell::{Cell, RefCell};
use core::sync::atomic::{AtomicBool, Ordering};
use std::collections::VecDeque;
use std::vec::Vec;
use usb_device::endpoint::{EndpointAddress, EndpointType};
use usb_device::UsbError;
use crate::endpoint::EndpointIo;
use crate::section::CriticalSection;

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Call {
    Open(u8, EndpointType, u16),
    Close(u8),
    Transmit(u8, Vec<u8>),
    Receive { ep: u8, capacity: usize, ptr: usize },
    ControlTransmit(Vec<u8>),
    ControlReceive(usize),
}

/// Ordered log of section boundaries and endpoint calls, shared by [`TracingSection`] and
/// [`MockEndpoints::traced`].
#[derive(Default)]
pub struct Trace(spin::Mutex<Vec<&'static str>>);

impl Trace {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: &'static str) {
        self.0.lock().push(event);
    }

    /// Returns the events logged so far and clears the log.
    pub fn take(&self) -> Vec<&'static str> {
        core::mem::take(&mut *self.0.lock())
    }
}

/// Critical section that logs `enter`/`exit` and panics when entered while already held.
pub struct TracingSection<'t> {
    trace: &'t Trace,
    held: AtomicBool,
}

impl<'t> TracingSection<'t> {
    pub fn new(trace: &'t Trace) -> Self {
        TracingSection {
            trace,
            held: AtomicBool::new(false),
        }
    }

    pub fn is_held(&self) -> bool {
        self.held.load(Ordering::SeqCst)
    }
}

impl CriticalSection for TracingSection<'_> {
    fn with<R>(&self, f: impl FnOnce() -> R) -> R {
        assert!(
            !self.held.swap(true, Ordering::SeqCst),
            "critical section entered while held"
        );
        self.trace.push("enter");

        let r = f();

        self.trace.push("exit");
        self.held.store(false, Ordering::SeqCst);
        r
    }
}

#[derive(Default)]
pub struct MockEndpoints<'t> {
    calls: RefCell<Vec<Call>>,
    trace: Option<&'t Trace>,
    fail_open: Cell<Option<(u8, UsbError)>>,
    fail_close: Cell<Option<(u8, UsbError)>>,
    fail_transmit: Cell<Option<UsbError>>,
    control_out: RefCell<VecDeque<Vec<u8>>>,
}

impl<'t> MockEndpoints<'t> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Also logs every call to `trace`.
    pub fn traced(trace: &'t Trace) -> Self {
        MockEndpoints {
            trace: Some(trace),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn clear(&self) {
        self.calls.borrow_mut().clear();
    }

    /// Makes opening `ep` fail with `err`.
    pub fn fail_open(&self, ep: u8, err: UsbError) {
        self.fail_open.set(Some((ep, err)));
    }

    pub fn fail_close(&self, ep: u8, err: UsbError) {
        self.fail_close.set(Some((ep, err)));
    }

    /// Makes the next transmit fail with `err`.
    pub fn fail_transmit(&self, err: UsbError) {
        self.fail_transmit.set(Some(err));
    }

    /// Queues the OUT data stage of the next control transfer.
    pub fn push_control_out(&self, data: &[u8]) {
        self.control_out.borrow_mut().push_back(data.to_vec());
    }

    fn record(&self, event: &'static str, call: Call) {
        if let Some(trace) = self.trace {
            trace.push(event);
        }
        self.calls.borrow_mut().push(call);
    }

    fn injected(slot: &Cell<Option<(u8, UsbError)>>, ep: u8) -> usb_device::Result<()> {
        match slot.get() {
            Some((fail_ep, err)) if fail_ep == ep => Err(err),
            _ => Ok(()),
        }
    }
}

impl EndpointIo for MockEndpoints<'_> {
    fn open_endpoint(
        &self,
        ep_addr: EndpointAddress,
        ep_type: EndpointType,
        max_packet_size: u16,
    ) -> usb_device::Result<()> {
        let ep = u8::from(ep_addr);
        self.record("open", Call::Open(ep, ep_type, max_packet_size));
        Self::injected(&self.fail_open, ep)
    }

    fn close_endpoint(&self, ep_addr: EndpointAddress) -> usb_device::Result<()> {
        let ep = u8::from(ep_addr);
        self.record("close", Call::Close(ep));
        Self::injected(&self.fail_close, ep)
    }

    fn transmit(&self, ep_addr: EndpointAddress, data: &[u8]) -> usb_device::Result<()> {
        if let Some(err) = self.fail_transmit.take() {
            return Err(err);
        }

        self.record("transmit", Call::Transmit(u8::from(ep_addr), data.to_vec()));
        Ok(())
    }

    fn receive(&self, ep_addr: EndpointAddress, buf: &mut [u8]) {
        self.record(
            "receive",
            Call::Receive {
                ep: u8::from(ep_addr),
                capacity: buf.len(),
                ptr: buf.as_ptr() as usize,
            },
        );
    }

    fn control_transmit(&self, data: &[u8]) {
        self.record("control_transmit", Call::ControlTransmit(data.to_vec()));
    }

    fn control_receive(&self, buf: &mut [u8]) -> usize {
        self.record("control_receive", Call::ControlReceive(buf.len()));

        match self.control_out.borrow_mut().pop_front() {
            Some(data) => {
                let len = core::cmp::min(data.len(), buf.len());
                buf[..len].copy_from_slice(&data[..len]);
                len
            }
            None => 0,
        }
    }
}
