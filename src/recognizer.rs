//! Device type recognition: probe a freshly-connected transport with the
//! generic v2-then-v1 base schemas until the `device_type` register yields a
//! non-empty string. Each schema is tried once with encryption and the long
//! timeout a handshake needs, then again in the clear with a short timeout,
//! since a v1 device never completes a handshake and would otherwise stall
//! every probe for the full encrypted timeout.

use crate::fields::FieldName;
use crate::schema::{catalogue, DeviceSchema, IotVersion};
use crate::reader::{DeviceReader, ReaderConfig};
use crate::transport::Transport;

#[derive(Debug, Clone, Copy)]
pub struct RecognizerConfig {
    pub encrypted_timeout: std::time::Duration,
    pub plain_timeout: std::time::Duration,
}

impl Default for RecognizerConfig {
    fn default() -> Self {
        Self {
            encrypted_timeout: std::time::Duration::from_secs(8),
            plain_timeout: std::time::Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecognizedDevice {
    pub device_type: String,
    pub iot_version: IotVersion,
    pub encrypted: bool,
}

/// Probe `transport` until a base schema yields a non-empty `device_type`.
/// Returns the transport back alongside the result (or on total failure) so
/// the caller can hand it to a [`DeviceReader`] built against the matched
/// model's full schema.
pub async fn recognize(
    mut transport: Box<dyn Transport>,
    config: RecognizerConfig,
) -> (Box<dyn Transport>, Option<RecognizedDevice>) {
    let candidates: [(fn() -> DeviceSchema, IotVersion); 2] =
        [(catalogue::base_device_v2, IotVersion::V2), (catalogue::base_device_v1, IotVersion::V1)];

    for (schema_fn, iot_version) in candidates {
        for (timeout, use_encryption) in [(config.encrypted_timeout, true), (config.plain_timeout, false)] {
            let reader_config = ReaderConfig { timeout, use_encryption, ..ReaderConfig::default() };
            let schema = schema_fn();
            let registers = schema.get_device_type_registers();
            let mut reader = DeviceReader::new(schema, transport, reader_config);

            let data = reader.read(Some(&registers)).await;
            transport = reader.into_transport();

            let Some(data) = data else { continue };
            let Some(value) = data.get(&FieldName::DeviceType) else {
                log::error!(target: "bluetti_rs::recognizer", "no data in device_type field");
                continue;
            };
            let Some(device_type) = value.as_str() else {
                log::error!(target: "bluetti_rs::recognizer", "device_type field was not a string");
                continue;
            };
            if device_type.is_empty() {
                continue;
            }

            return (
                transport,
                Some(RecognizedDevice { device_type: device_type.to_string(), iot_version, encrypted: use_encryption }),
            );
        }
    }

    (transport, None)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ReaderError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedTransport {
        responses: Mutex<VecDeque<Result<Vec<u8>, ReaderError>>>,
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn connect(&mut self) -> Result<(), ReaderError> {
            Ok(())
        }
        async fn write(&mut self, _data: &[u8]) -> Result<(), ReaderError> {
            Ok(())
        }
        async fn recv_notification(&mut self) -> Result<Vec<u8>, ReaderError> {
            self.responses.lock().unwrap().pop_front().unwrap_or(Err(ReaderError::Timeout))
        }
        fn mtu(&self) -> usize {
            20
        }
        async fn disconnect(&mut self) -> Result<(), ReaderError> {
            Ok(())
        }
    }

    fn device_type_response(name: &str) -> Vec<u8> {
        let mut padded = name.as_bytes().to_vec();
        padded.resize(12, 0);
        let mut frame = vec![0x01, 0x03, 0x0C];
        frame.extend_from_slice(&padded);
        crate::crc::append_crc(&mut frame);
        frame
    }

    #[tokio::test]
    async fn falls_through_v2_to_v1_plain_and_recognizes() {
        // v2 encrypted attempt's handshake never completes (falls back to a
        // plain read), v2 plain and v1 encrypted both get an empty
        // device_type, v1 plain finally succeeds.
        let responses = VecDeque::from(vec![
            Err(ReaderError::Timeout), // handshake recv, attempt 1
            Ok(device_type_response("")), // read, attempt 1 (fallback)
            Ok(device_type_response("")), // read, attempt 2 (v2 plain)
            Ok(device_type_response("")), // read, attempt 3 (v1 encrypted, no-op)
            Ok(device_type_response("AC300")), // read, attempt 4 (v1 plain)
        ]);
        let transport: Box<dyn Transport> = Box::new(ScriptedTransport { responses: Mutex::new(responses) });

        let config = RecognizerConfig {
            encrypted_timeout: std::time::Duration::from_millis(50),
            plain_timeout: std::time::Duration::from_millis(50),
        };
        let (_transport, result) = recognize(transport, config).await;
        let result = result.unwrap();
        assert_eq!(result.device_type, "AC300");
        assert_eq!(result.iot_version, IotVersion::V1);
        assert!(!result.encrypted);
    }

    #[tokio::test]
    async fn no_candidate_yields_none() {
        let transport: Box<dyn Transport> =
            Box::new(ScriptedTransport { responses: Mutex::new(VecDeque::new()) });
        let config = RecognizerConfig {
            encrypted_timeout: std::time::Duration::from_millis(20),
            plain_timeout: std::time::Duration::from_millis(20),
        };
        let (_transport, result) = recognize(transport, config).await;
        assert!(result.is_none());
    }
}
