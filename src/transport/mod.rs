//! The link between a [`crate::reader::DeviceReader`] and a device's GATT
//! MODBUS tunnel. [`Transport`] is the abstraction boundary: the reader and
//! recognizer never touch a concrete BLE stack directly, so tests exercise
//! the full protocol state machine against an in-memory mock instead of
//! real hardware.

#[cfg(feature = "btleplug-transport")]
pub mod btleplug_transport;

use crate::error::ReaderError;
use async_trait::async_trait;

/// One inbound GATT notification payload, possibly a fragment of a larger
/// MODBUS frame once reassembled by the caller.
pub type Notification = Vec<u8>;

/// A connected BLE link exposing the vendor write/notify characteristic
/// pair. Implementors own reconnection and MTU negotiation; callers only
/// see whole notification payloads and a fixed usable chunk size.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Establish the GATT connection and subscribe to notifications.
    async fn connect(&mut self) -> Result<(), ReaderError>;

    /// Write one chunk to the vendor write characteristic. Callers are
    /// responsible for splitting frames larger than [`Transport::mtu`].
    async fn write(&mut self, data: &[u8]) -> Result<(), ReaderError>;

    /// Block until the next notification arrives, or the transport's own
    /// timeout elapses.
    async fn recv_notification(&mut self) -> Result<Notification, ReaderError>;

    /// Usable notification payload size after ATT header overhead.
    fn mtu(&self) -> usize;

    async fn disconnect(&mut self) -> Result<(), ReaderError>;
}
