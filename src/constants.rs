//! Protocol constants: MODBUS function/exception codes, the CRC-16
//! parameters, and the fixed GATT service/characteristic UUIDs.

/// Unit/slave address used for every frame on this single-device link.
pub const UNIT_ADDRESS: u8 = 0x01;

pub const FN_READ_HOLDING_REGISTERS: u8 = 0x03;
pub const FN_WRITE_SINGLE_REGISTER: u8 = 0x06;
pub const FN_WRITE_MULTIPLE_REGISTERS: u8 = 0x10;

/// A MODBUS exception response sets the top bit of the request's function code.
pub const EXCEPTION_BIT: u8 = 0x80;

pub const EXCEPTION_ILLEGAL_FUNCTION: u8 = 0x01;
pub const EXCEPTION_ILLEGAL_DATA_ADDRESS: u8 = 0x02;
pub const EXCEPTION_ILLEGAL_DATA_VALUE: u8 = 0x03;

/// Largest quantity a single read-holding-registers request may ask for.
pub const MAX_READ_QUANTITY: u16 = 125;

/// MODBUS CRC-16 polynomial (reflected form) and seed.
pub const CRC16_POLY: u16 = 0xA001;
pub const CRC16_INIT: u16 = 0xFFFF;

/// GATT service exposing the vendor MODBUS tunnel.
pub const GATT_SERVICE_UUID: &str = "0000ff00-0000-1000-8000-00805f9b34fb";
/// Characteristic the client writes MODBUS frames to.
pub const GATT_WRITE_CHARACTERISTIC_UUID: &str = "0000ff02-0000-1000-8000-00805f9b34fb";
/// Characteristic the device notifies MODBUS responses on.
pub const GATT_NOTIFY_CHARACTERISTIC_UUID: &str = "0000ff01-0000-1000-8000-00805f9b34fb";

/// ATT overhead subtracted from the negotiated MTU to get the usable
/// notification payload size.
pub const ATT_HEADER_OVERHEAD: usize = 3;
