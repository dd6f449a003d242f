//! The Device Reader: connect, optionally handshake, plan ranges, issue
//! MODBUS reads over the transport's notification channel, reassemble
//! fragments, validate, decode. Grounded on the same retry/timeout
//! shape as a classic request-response bus driver, adapted to a
//! notification-based transport with one outstanding request at a time.

use crate::codec::{self, ModbusResponse};
use crate::constants::FN_READ_HOLDING_REGISTERS;
use crate::error::ReaderError;
use crate::fields::{FieldName, Value};
use crate::schema::{planner, DeviceSchema, Range};
use crate::transport::Transport;
use crate::util::logging::{log_frame_hex, LogThrottle};
use std::collections::HashMap;
use std::time::Duration;
use tokio::time::timeout;

const LOG_TARGET: &str = "bluetti_rs::reader";

/// A decoded read result: either typed values keyed by field name, or, in
/// `raw` mode, the exact bytes for each planned range keyed by its starting
/// register address.
#[derive(Debug, Clone, PartialEq)]
pub enum ReadOutput {
    Decoded(HashMap<FieldName, Value>),
    Raw(HashMap<u16, Vec<u8>>),
}

#[derive(Debug, Clone)]
pub struct ReaderConfig {
    /// Consecutive connection-error retries before a read gives up.
    pub retry_budget: u32,
    pub timeout: Duration,
    pub max_registers: u16,
    pub merge_gap: u16,
    pub use_encryption: bool,
}

impl Default for ReaderConfig {
    fn default() -> Self {
        Self {
            retry_budget: 10,
            timeout: Duration::from_secs(3),
            max_registers: 125,
            merge_gap: 0,
            use_encryption: true,
        }
    }
}

impl ReaderConfig {
    pub fn with_timeout_secs(secs: u64) -> Self {
        Self { timeout: Duration::from_secs(secs), ..Self::default() }
    }
}

pub struct DeviceReader {
    schema: DeviceSchema,
    transport: Box<dyn Transport>,
    config: ReaderConfig,
    connected: bool,
    handshake_warnings: LogThrottle,
    #[cfg(feature = "crypto")]
    session: Option<crate::crypto::aes_session::AesSession>,
}

impl DeviceReader {
    pub fn new(schema: DeviceSchema, transport: Box<dyn Transport>, config: ReaderConfig) -> Self {
        Self {
            schema,
            transport,
            config,
            connected: false,
            handshake_warnings: LogThrottle::new(60_000, 3),
            #[cfg(feature = "crypto")]
            session: None,
        }
    }

    /// Read `fields` (or every field in the schema when `None`), decoding
    /// each register slice. `None` means the read failed after exhausting
    /// the connection-error retry budget or hit a CRC mismatch.
    pub async fn read(&mut self, fields: Option<&[FieldName]>) -> Option<HashMap<FieldName, Value>> {
        match self.read_ranges(fields).await? {
            ReadOutput::Decoded(map) => Some(map),
            ReadOutput::Raw(_) => unreachable!("read() always requests decoded output"),
        }
    }

    /// Like [`DeviceReader::read`], but returns the raw per-range bytes
    /// instead of decoding them.
    pub async fn read_raw(&mut self, fields: Option<&[FieldName]>) -> Option<HashMap<u16, Vec<u8>>> {
        match self.read_ranges_mode(fields, true).await? {
            ReadOutput::Raw(map) => Some(map),
            ReadOutput::Decoded(_) => unreachable!("read_raw() always requests raw output"),
        }
    }

    async fn read_ranges(&mut self, fields: Option<&[FieldName]>) -> Option<ReadOutput> {
        self.read_ranges_mode(fields, false).await
    }

    async fn read_ranges_mode(&mut self, fields: Option<&[FieldName]>, raw: bool) -> Option<ReadOutput> {
        let selected: Vec<&crate::fields::Field> = match fields {
            Some(names) => self
                .schema
                .fields
                .iter()
                .filter(|f| names.contains(&f.name()))
                .collect(),
            None => self.schema.fields.iter().collect(),
        };
        if selected.is_empty() {
            return Some(if raw { ReadOutput::Raw(HashMap::new()) } else { ReadOutput::Decoded(HashMap::new()) });
        }

        let ranges = planner::plan_ranges(&selected, self.config.max_registers, self.config.merge_gap);
        let selected: Vec<crate::fields::Field> = selected.into_iter().cloned().collect();

        if self.schema.iot_version == crate::schema::IotVersion::V2 && self.config.use_encryption {
            if let Err(e) = self.ensure_handshake().await {
                if self.handshake_warnings.allow() {
                    log::warn!(target: LOG_TARGET, "handshake failed, falling back to unencrypted: {e}");
                }
            }
        }

        let mut raw_map: HashMap<u16, Vec<u8>> = HashMap::new();
        for range in &ranges {
            match self.read_one_range(*range).await {
                Ok(payload) => {
                    raw_map.insert(range.lo, payload);
                }
                // A CRC mismatch fails the whole read; the source treats a bad
                // CRC as a bad device, not a transient fault worth retrying.
                Err(ReaderError::CrcMismatch { .. }) => return None,
                Err(ReaderError::Connection(_)) | Err(ReaderError::Timeout) => return None,
                Err(_) => {
                    // MODBUS exception: empty slice for raw mode, omitted fields otherwise.
                    raw_map.insert(range.lo, Vec::new());
                }
            }
        }

        if raw {
            return Some(ReadOutput::Raw(raw_map));
        }

        let mut decoded = HashMap::new();
        for field in &selected {
            let Some(bytes) = raw_map.get(&field.address()) else { continue };
            if bytes.is_empty() {
                continue;
            }
            let offset = 2 * (field.address() - find_range_start(&ranges, field.address())) as usize;
            let end = offset + 2 * field.size() as usize;
            let Some(slice) = bytes.get(offset..end) else { continue };
            if let Some(value) = field.decode(slice) {
                decoded.insert(field.name(), value);
            }
        }
        Some(ReadOutput::Decoded(decoded))
    }

    async fn read_one_range(&mut self, range: Range) -> Result<Vec<u8>, ReaderError> {
        let quantity = range.len();
        let request = codec::build_read(range.lo, quantity)?;
        let expected_len = codec::expected_response_len(FN_READ_HOLDING_REGISTERS, quantity);

        let frame = self.send_with_retry(&request, expected_len).await?;
        match codec::parse_response(&frame, FN_READ_HOLDING_REGISTERS, quantity)? {
            ModbusResponse::Data(payload) => Ok(payload),
            ModbusResponse::Exception(_) => Err(ReaderError::ModbusException(0)),
        }
    }

    /// Send one request and reassemble its response, retrying the whole
    /// connect+write+receive cycle on connection errors up to the
    /// configured budget. Logs exactly one `Timeout` warning for the
    /// entire retry run, not one per attempt.
    async fn send_with_retry(&mut self, request: &[u8], expected_len: usize) -> Result<Vec<u8>, ReaderError> {
        let mut last_err = ReaderError::Timeout;
        for _ in 0..self.config.retry_budget {
            match self.send_once(request, expected_len).await {
                Ok(frame) => return Ok(frame),
                Err(e @ (ReaderError::Connection(_) | ReaderError::Timeout)) => {
                    last_err = e;
                    self.connected = false;
                    continue;
                }
                Err(e) => return Err(e),
            }
        }
        log::warn!(target: LOG_TARGET, "Timeout");
        Err(last_err)
    }

    async fn send_once(&mut self, request: &[u8], expected_len: usize) -> Result<Vec<u8>, ReaderError> {
        if !self.connected {
            self.transport.connect().await?;
            self.connected = true;
        }

        let wrapped = self.maybe_wrap(request)?;
        log_frame_hex("tx", &wrapped);
        timeout(self.config.timeout, self.transport.write(&wrapped))
            .await
            .map_err(|_| ReaderError::Timeout)??;

        let mut buf = Vec::with_capacity(expected_len);
        while buf.len() < expected_len {
            let chunk = timeout(self.config.timeout, self.transport.recv_notification())
                .await
                .map_err(|_| ReaderError::Timeout)??;
            buf.extend_from_slice(&chunk);
        }
        log_frame_hex("rx", &buf);
        self.maybe_unwrap(&buf)
    }

    async fn ensure_handshake(&mut self) -> Result<(), ReaderError> {
        #[cfg(feature = "crypto")]
        {
            if self.session.is_some() {
                return Ok(());
            }
            if !self.connected {
                self.transport.connect().await?;
                self.connected = true;
            }
            let material = crate::crypto::handshake::perform(self.transport.as_mut()).await?;
            let session = crate::crypto::aes_session::AesSession::new(
                crate::crypto::SessionKey(material.key),
                material.iv,
                self.schema.encryption_mode,
            );
            self.session = Some(session);
        }
        Ok(())
    }

    fn maybe_wrap(&self, frame: &[u8]) -> Result<Vec<u8>, ReaderError> {
        #[cfg(feature = "crypto")]
        if let Some(session) = &self.session {
            return session.wrap(frame);
        }
        Ok(frame.to_vec())
    }

    fn maybe_unwrap(&self, frame: &[u8]) -> Result<Vec<u8>, ReaderError> {
        #[cfg(feature = "crypto")]
        if let Some(session) = &self.session {
            return session.unwrap(frame);
        }
        Ok(frame.to_vec())
    }

    pub async fn write(&mut self, name: FieldName, value: Value) -> Result<(), ReaderError> {
        let field = self
            .schema
            .field(name)
            .ok_or_else(|| ReaderError::WriteRejected(format!("{name} is not in this schema")))?;
        if !field.is_writeable() || !self.schema.is_writable_address(field.address()) {
            return Err(ReaderError::WriteRejected(format!("{name} is not writable")));
        }
        let encoded = field
            .encode(&value)
            .ok_or_else(|| ReaderError::WriteRejected(format!("value rejected for {name}")))?;
        let raw = u16::from_be_bytes([encoded[0], encoded[1]]);
        let request = codec::build_write_single(field.address(), raw);
        let expected_len = codec::expected_response_len(crate::constants::FN_WRITE_SINGLE_REGISTER, 1);
        let frame = self.send_with_retry(&request, expected_len).await?;
        match codec::parse_response(&frame, crate::constants::FN_WRITE_SINGLE_REGISTER, 1)? {
            ModbusResponse::Data(_) => Ok(()),
            ModbusResponse::Exception(e) => Err(ReaderError::ModbusException(e.code)),
        }
    }

    pub async fn disconnect(&mut self) -> Result<(), ReaderError> {
        if self.connected {
            self.transport.disconnect().await?;
            self.connected = false;
        }
        Ok(())
    }

    /// Reclaim the underlying transport, e.g. to hand it to a reader built
    /// against a different schema/config after a failed probe.
    pub fn into_transport(self) -> Box<dyn Transport> {
        self.transport
    }
}

fn find_range_start(ranges: &[Range], address: u16) -> u16 {
    ranges
        .iter()
        .find(|r| r.lo <= address && address < r.hi)
        .map(|r| r.lo)
        .unwrap_or(address)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::catalogue;
    use crate::transport::Notification;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct MockTransport {
        responses: Mutex<VecDeque<Result<Vec<u8>, ReaderError>>>,
        mtu: usize,
    }

    impl MockTransport {
        fn new(responses: Vec<Result<Vec<u8>, ReaderError>>) -> Self {
            Self { responses: Mutex::new(responses.into()), mtu: 20 }
        }
    }

    #[async_trait]
    impl Transport for MockTransport {
        async fn connect(&mut self) -> Result<(), ReaderError> {
            Ok(())
        }
        async fn write(&mut self, _data: &[u8]) -> Result<(), ReaderError> {
            Ok(())
        }
        async fn recv_notification(&mut self) -> Result<Notification, ReaderError> {
            self.responses.lock().unwrap().pop_front().unwrap_or(Err(ReaderError::Timeout))
        }
        fn mtu(&self) -> usize {
            self.mtu
        }
        async fn disconnect(&mut self) -> Result<(), ReaderError> {
            Ok(())
        }
    }

    fn ok_response(bytes: Vec<u8>) -> Result<Vec<u8>, ReaderError> {
        Ok(bytes)
    }

    #[tokio::test]
    async fn device_type_probe_reads_only_requested_field() {
        let mut response = vec![0x01, 0x03, 0x0C];
        response.extend_from_slice(b"AC300\0\0\0\0\0\0\0");
        crate::crc::append_crc(&mut response);

        let transport = Box::new(MockTransport::new(vec![ok_response(response)]));
        let mut reader = DeviceReader::new(catalogue::base_device_v1(), transport, ReaderConfig::default());

        let result = reader.read(Some(&[FieldName::DeviceType])).await.unwrap();
        assert_eq!(result.get(&FieldName::DeviceType).unwrap().as_str(), Some("AC300"));
    }

    #[tokio::test]
    async fn ten_connection_errors_exhaust_retry_budget() {
        let responses = (0..10).map(|_| Err(ReaderError::Connection("dropped".into()))).collect();
        let transport = Box::new(MockTransport::new(responses));
        let mut reader = DeviceReader::new(catalogue::base_device_v1(), transport, ReaderConfig::default());

        let result = reader.read(Some(&[FieldName::DeviceType])).await;
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn exception_response_yields_empty_raw_slice() {
        let mut exception = vec![0x01, 0x83, 0x02];
        crate::crc::append_crc(&mut exception);

        let transport = Box::new(MockTransport::new(vec![ok_response(exception)]));
        let mut reader = DeviceReader::new(catalogue::base_device_v1(), transport, ReaderConfig::default());

        let result = reader.read_raw(Some(&[FieldName::DeviceType])).await.unwrap();
        assert_eq!(result.get(&10), Some(&Vec::new()));
    }

    #[tokio::test]
    async fn crc_mismatch_abandons_whole_read() {
        let mut response = vec![0x01, 0x03, 0x0C];
        response.extend_from_slice(b"AC300\0\0\0\0\0\0\0");
        crate::crc::append_crc(&mut response);
        let last = response.len() - 1;
        response[last] ^= 0xFF;

        let transport = Box::new(MockTransport::new(vec![ok_response(response)]));
        let mut reader = DeviceReader::new(catalogue::base_device_v1(), transport, ReaderConfig::default());

        assert!(reader.read(Some(&[FieldName::DeviceType])).await.is_none());
    }
}
