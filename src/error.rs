//! # Reader Error Handling
//!
//! Defines the [`ReaderError`] enum, the single error type surfaced by the
//! transport, codec, crypto and reader layers of this crate.

use thiserror::Error;

/// Errors that can occur while talking to a device.
#[derive(Debug, Error)]
pub enum ReaderError {
    /// The GATT transport failed to connect, or the link dropped mid-session.
    #[error("connection error: {0}")]
    Connection(String),

    /// No complete response arrived within the configured timeout.
    #[error("timeout waiting for response")]
    Timeout,

    /// A response frame failed its CRC-16 check.
    #[error("crc mismatch: expected {expected:04x}, calculated {calculated:04x}")]
    CrcMismatch { expected: u16, calculated: u16 },

    /// The device returned a MODBUS exception response.
    #[error("modbus exception 0x{0:02x}")]
    ModbusException(u8),

    /// A response frame was shorter than the protocol allows.
    #[error("frame too short: {0} bytes")]
    FrameTooShort(usize),

    /// The RSA/AES handshake failed.
    #[error("crypto handshake failed: {0}")]
    Handshake(String),

    /// A write was rejected before any bytes were sent: either the field is
    /// not writable, or the value is outside its declared domain.
    #[error("write rejected: {0}")]
    WriteRejected(String),

    /// A catch-all for uncategorized failures.
    #[error("{0}")]
    Other(String),
}
