//! MODBUS RTU frame construction and parsing.
//!
//! Frames are fixed-format (unlike M-Bus's variable DIF/VIF records), so
//! unlike a `nom`-based parser this is plain byte slicing: every field's
//! offset is known from the function code alone.

use crate::constants::*;
use crate::crc;
use crate::error::ReaderError;

/// A decoded MODBUS exception response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModbusException {
    pub function: u8,
    pub code: u8,
}

impl ModbusException {
    pub fn is_illegal_function(&self) -> bool {
        self.code == EXCEPTION_ILLEGAL_FUNCTION
    }
    pub fn is_illegal_data_address(&self) -> bool {
        self.code == EXCEPTION_ILLEGAL_DATA_ADDRESS
    }
    pub fn is_illegal_data_value(&self) -> bool {
        self.code == EXCEPTION_ILLEGAL_DATA_VALUE
    }
}

/// Either a successful payload or a decoded exception.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModbusResponse {
    Data(Vec<u8>),
    Exception(ModbusException),
}

/// Build a read-holding-registers request (function 0x03).
///
/// `quantity` must be in `[1, 125]`.
pub fn build_read(addr: u16, quantity: u16) -> Result<Vec<u8>, ReaderError> {
    if quantity == 0 || quantity > MAX_READ_QUANTITY {
        return Err(ReaderError::Other(format!(
            "read quantity {quantity} out of range [1, {MAX_READ_QUANTITY}]"
        )));
    }
    let mut frame = vec![UNIT_ADDRESS, FN_READ_HOLDING_REGISTERS];
    frame.extend_from_slice(&addr.to_be_bytes());
    frame.extend_from_slice(&quantity.to_be_bytes());
    crc::append_crc(&mut frame);
    Ok(frame)
}

/// Build a write-single-register request (function 0x06).
pub fn build_write_single(addr: u16, value: u16) -> Vec<u8> {
    let mut frame = vec![UNIT_ADDRESS, FN_WRITE_SINGLE_REGISTER];
    frame.extend_from_slice(&addr.to_be_bytes());
    frame.extend_from_slice(&value.to_be_bytes());
    crc::append_crc(&mut frame);
    frame
}

/// Build a write-multiple-registers request (function 0x10).
pub fn build_write_multi(addr: u16, values: &[u16]) -> Result<Vec<u8>, ReaderError> {
    let quantity = values.len() as u16;
    if values.is_empty() || quantity as usize != values.len() {
        return Err(ReaderError::Other("write_multi requires at least one value".into()));
    }
    let mut frame = vec![UNIT_ADDRESS, FN_WRITE_MULTIPLE_REGISTERS];
    frame.extend_from_slice(&addr.to_be_bytes());
    frame.extend_from_slice(&quantity.to_be_bytes());
    frame.push((quantity * 2) as u8);
    for v in values {
        frame.extend_from_slice(&v.to_be_bytes());
    }
    crc::append_crc(&mut frame);
    Ok(frame)
}

/// Number of bytes a complete response to `(function, quantity)` will be,
/// ignoring the possibility of an exception (which is always 5 bytes).
pub fn expected_response_len(function: u8, quantity: u16) -> usize {
    match function {
        FN_READ_HOLDING_REGISTERS => 3 + 2 * quantity as usize + 2,
        FN_WRITE_SINGLE_REGISTER | FN_WRITE_MULTIPLE_REGISTERS => 8,
        _ => 5,
    }
}

/// Parse a complete response frame. `expected_function` is the function code
/// that was requested (without the exception bit); `expected_quantity` is
/// only consulted for read responses, to size the returned payload.
pub fn parse_response(
    frame: &[u8],
    expected_function: u8,
    expected_quantity: u16,
) -> Result<ModbusResponse, ReaderError> {
    if frame.len() < 5 {
        return Err(ReaderError::FrameTooShort(frame.len()));
    }
    if !crc::verify_crc(frame) {
        let (payload, trailer) = frame.split_at(frame.len() - 2);
        return Err(ReaderError::CrcMismatch {
            expected: u16::from_le_bytes([trailer[0], trailer[1]]),
            calculated: crc::crc16(payload),
        });
    }

    let function = frame[1];
    if function == expected_function | EXCEPTION_BIT {
        return Ok(ModbusResponse::Exception(ModbusException {
            function: expected_function,
            code: frame[2],
        }));
    }
    if function != expected_function {
        return Err(ReaderError::Other(format!(
            "unexpected function code 0x{function:02x}, expected 0x{expected_function:02x}"
        )));
    }

    match function {
        FN_READ_HOLDING_REGISTERS => {
            let byte_count = frame[2] as usize;
            if byte_count != 2 * expected_quantity as usize || frame.len() < 3 + byte_count + 2 {
                return Err(ReaderError::FrameTooShort(frame.len()));
            }
            Ok(ModbusResponse::Data(frame[3..3 + byte_count].to_vec()))
        }
        FN_WRITE_SINGLE_REGISTER | FN_WRITE_MULTIPLE_REGISTERS => {
            Ok(ModbusResponse::Data(frame[2..frame.len() - 2].to_vec()))
        }
        other => Err(ReaderError::Other(format!("unsupported function code 0x{other:02x}"))),
    }
}
