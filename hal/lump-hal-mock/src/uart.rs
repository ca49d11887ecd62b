//! In-memory UART with lifecycle recording

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;

use lump_hal::Uart;

#[derive(Default)]
struct UartState {
    /// Current baud rate; `None` while the interface is closed.
    baud: Option<u32>,
    /// Every `begin` call in order.
    begin_calls: Vec<u32>,
    flush_count: u32,
    /// Bytes scripted by the test, waiting for the device to read.
    to_device: VecDeque<u8>,
    /// Bytes the device wrote, waiting for the test to drain.
    from_device: Vec<u8>,
}

/// UART double wired back-to-back with the test.
///
/// Clones share the same wire, so the test keeps a handle while the
/// device owns the capability.
#[derive(Clone, Default)]
pub struct MockUart {
    state: Rc<RefCell<UartState>>,
}

impl MockUart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script bytes arriving from the host.
    pub fn host_send(&self, bytes: &[u8]) {
        self.state.borrow_mut().to_device.extend(bytes);
    }

    /// Drain everything the device has written so far.
    pub fn take_written(&self) -> Vec<u8> {
        std::mem::take(&mut self.state.borrow_mut().from_device)
    }

    /// Current baud rate, `None` while closed.
    pub fn baud(&self) -> Option<u32> {
        self.state.borrow().baud
    }

    /// Baud rates passed to `begin`, in call order.
    pub fn begin_calls(&self) -> Vec<u32> {
        self.state.borrow().begin_calls.clone()
    }

    pub fn flush_count(&self) -> u32 {
        self.state.borrow().flush_count
    }

    /// Bytes scripted but not yet consumed by the device.
    pub fn pending_to_device(&self) -> usize {
        self.state.borrow().to_device.len()
    }
}

impl Uart for MockUart {
    fn begin(&mut self, baudrate: u32) {
        let mut state = self.state.borrow_mut();
        state.baud = Some(baudrate);
        state.begin_calls.push(baudrate);
    }

    fn end(&mut self) {
        self.state.borrow_mut().baud = None;
    }

    fn write_byte(&mut self, byte: u8) {
        self.state.borrow_mut().from_device.push(byte);
    }

    fn write(&mut self, data: &[u8]) {
        self.state.borrow_mut().from_device.extend_from_slice(data);
    }

    fn read(&mut self) -> Option<u8> {
        self.state.borrow_mut().to_device.pop_front()
    }

    fn available(&self) -> bool {
        !self.state.borrow().to_device.is_empty()
    }

    fn flush(&mut self) {
        self.state.borrow_mut().flush_count += 1;
    }
}
