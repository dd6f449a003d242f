//! A full in-memory device mock: register memory, MODBUS command handling,
//! and injectable failures, behind the crate's [`bluetti_rs::Transport`]
//! trait so integration tests exercise the real reader/codec/planner instead
//! of a hand-rolled shortcut.

use bluetti_rs::error::ReaderError;
use bluetti_rs::transport::{Notification, Transport};
use bluetti_rs::{constants, crc};
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};

/// Sparse register file. Reading an address nobody has written to yields 0,
/// matching the real device's power-on default.
#[derive(Default)]
pub struct RegisterMemory {
    registers: HashMap<u16, u16>,
}

impl RegisterMemory {
    pub fn set(&mut self, addr: u16, value: u16) {
        self.registers.insert(addr, value);
    }

    pub fn set_bytes(&mut self, addr: u16, bytes: &[u8]) {
        for (i, chunk) in bytes.chunks(2).enumerate() {
            let hi = chunk[0];
            let lo = *chunk.get(1).unwrap_or(&0);
            self.set(addr + i as u16, u16::from_be_bytes([hi, lo]));
        }
    }

    pub fn get(&self, addr: u16) -> u16 {
        *self.registers.get(&addr).unwrap_or(&0)
    }
}

/// A single queued fault. Consumed only when its variant matches what the
/// handler is about to do; non-matching injections stay queued for later.
pub enum Failure {
    Timeout,
    CrcError,
    ConnectionError,
}

#[derive(Default)]
pub struct FailureInjector {
    queue: VecDeque<Failure>,
}

impl FailureInjector {
    pub fn push(&mut self, failure: Failure) {
        self.queue.push_back(failure);
    }

    fn take_if<F: Fn(&Failure) -> bool>(&mut self, matches: F) -> bool {
        if self.queue.front().map(&matches).unwrap_or(false) {
            self.queue.pop_front();
            true
        } else {
            false
        }
    }
}

pub struct MockModbusHandler {
    pub memory: RegisterMemory,
    pub readable: (u16, u16),
    pub writable: (u16, u16),
    pub failures: FailureInjector,
}

impl MockModbusHandler {
    pub fn new(readable: (u16, u16), writable: (u16, u16)) -> Self {
        Self { memory: RegisterMemory::default(), readable, writable, failures: FailureInjector::default() }
    }

    fn exception(function: u8, code: u8) -> Vec<u8> {
        let mut frame = vec![constants::UNIT_ADDRESS, function | constants::EXCEPTION_BIT, code];
        crc::append_crc(&mut frame);
        frame
    }

    /// Process one already-CRC-checked-by-caller request frame, returning
    /// the full response frame (itself CRC-trailed).
    pub fn handle(&mut self, request: &[u8]) -> Option<Vec<u8>> {
        if self.failures.take_if(|f| matches!(f, Failure::ConnectionError)) {
            return None;
        }
        if self.failures.take_if(|f| matches!(f, Failure::Timeout)) {
            return Some(Vec::new());
        }
        if !crc::verify_crc(request) {
            return Some(Self::exception(request[1], constants::EXCEPTION_ILLEGAL_DATA_VALUE));
        }

        let function = request[1];
        let addr = u16::from_be_bytes([request[2], request[3]]);

        let mut response = match function {
            constants::FN_READ_HOLDING_REGISTERS => {
                let quantity = u16::from_be_bytes([request[4], request[5]]);
                if addr < self.readable.0 || addr + quantity > self.readable.1 {
                    Self::exception(function, constants::EXCEPTION_ILLEGAL_DATA_ADDRESS)
                } else {
                    let mut frame =
                        vec![constants::UNIT_ADDRESS, function, (quantity * 2) as u8];
                    for i in 0..quantity {
                        frame.extend_from_slice(&self.memory.get(addr + i).to_be_bytes());
                    }
                    frame
                }
            }
            constants::FN_WRITE_SINGLE_REGISTER => {
                if addr < self.writable.0 || addr >= self.writable.1 {
                    Self::exception(function, constants::EXCEPTION_ILLEGAL_DATA_ADDRESS)
                } else {
                    let value = u16::from_be_bytes([request[4], request[5]]);
                    self.memory.set(addr, value);
                    request[..6].to_vec()
                }
            }
            other => Self::exception(other, constants::EXCEPTION_ILLEGAL_FUNCTION),
        };

        crc::append_crc(&mut response);
        if self.failures.take_if(|f| matches!(f, Failure::CrcError)) {
            let last = response.len() - 1;
            response[last] ^= 0xFF;
        }
        Some(response)
    }
}

/// A [`Transport`] backed by a [`MockModbusHandler`], chunking responses
/// into MTU-sized notifications the way a real GATT characteristic would.
pub struct MockTransport {
    handler: Arc<Mutex<MockModbusHandler>>,
    mtu: usize,
    pending: VecDeque<Notification>,
}

impl MockTransport {
    pub fn new(handler: Arc<Mutex<MockModbusHandler>>, mtu: usize) -> Self {
        Self { handler, mtu, pending: VecDeque::new() }
    }
}

#[async_trait::async_trait]
impl Transport for MockTransport {
    async fn connect(&mut self) -> Result<(), ReaderError> {
        Ok(())
    }

    async fn write(&mut self, data: &[u8]) -> Result<(), ReaderError> {
        let response = {
            let mut handler = self.handler.lock().unwrap();
            handler.handle(data)
        };
        match response {
            None => Err(ReaderError::Connection("device dropped the link".into())),
            Some(frame) if frame.is_empty() => Err(ReaderError::Timeout),
            Some(frame) => {
                for chunk in frame.chunks(self.mtu) {
                    self.pending.push_back(chunk.to_vec());
                }
                Ok(())
            }
        }
    }

    async fn recv_notification(&mut self) -> Result<Notification, ReaderError> {
        self.pending.pop_front().ok_or(ReaderError::Timeout)
    }

    fn mtu(&self) -> usize {
        self.mtu
    }

    async fn disconnect(&mut self) -> Result<(), ReaderError> {
        Ok(())
    }
}
