//! # bluetti-rs - BLE MODBUS-RTU client for portable power stations
//!
//! Talks MODBUS-RTU tunneled over a BLE GATT characteristic pair to
//! Bluetti-style power stations: reads holding registers into typed field
//! values per a declarative per-model schema, writes to the handful of
//! control registers a model exposes, and (for IoT v2 models) negotiates an
//! RSA/AES session before any of that.
//!
//! ## Usage
//!
//! ```toml
//! [dependencies]
//! bluetti-rs = "0.1.0"
//! ```
//!
//! ```no_run
//! use bluetti_rs::{init_logger, schema::catalogue, reader::{DeviceReader, ReaderConfig}};
//!
//! # async fn example(transport: Box<dyn bluetti_rs::transport::Transport>) {
//! init_logger();
//! let mut reader = DeviceReader::new(catalogue::ac300(), transport, ReaderConfig::default());
//! let values = reader.read(None).await;
//! # }
//! ```

pub mod codec;
pub mod constants;
pub mod crc;
pub mod error;
pub mod fields;
pub mod logging;
pub mod reader;
pub mod recognizer;
pub mod schema;
pub mod transport;
pub mod util;

#[cfg(feature = "crypto")]
pub mod crypto;

pub use error::ReaderError;
pub use fields::{Field, FieldName, Value};
pub use logging::{init_logger, log_debug, log_error, log_info, log_warn};
pub use reader::{DeviceReader, ReaderConfig};
pub use recognizer::{recognize, RecognizedDevice, RecognizerConfig};
pub use schema::{DeviceSchema, EncryptionMode, IotVersion};
pub use transport::Transport;
