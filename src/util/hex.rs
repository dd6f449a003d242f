//! Hex encoding helpers used for logging and fixture data in tests.

use thiserror::Error;

/// Errors that can occur during hex decoding.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HexError {
    #[error("odd number of hex characters: {0}")]
    OddLength(usize),

    #[error("empty hex string")]
    EmptyString,

    #[error("hex decoding error: {0}")]
    DecodeError(String),
}

/// Encode bytes to lowercase hex.
pub fn encode_hex(data: &[u8]) -> String {
    hex::encode(data)
}

/// Decode a hex string, stripping whitespace first.
pub fn decode_hex(hex_str: &str) -> Result<Vec<u8>, HexError> {
    if hex_str.is_empty() {
        return Err(HexError::EmptyString);
    }

    let cleaned: String = hex_str.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.len() % 2 != 0 {
        return Err(HexError::OddLength(cleaned.len()));
    }

    hex::decode(&cleaned).map_err(|e| HexError::DecodeError(e.to_string()))
}

/// Format bytes as space-separated hex pairs, for log lines (`"01 03 06 ..."`).
pub fn format_hex_compact(data: &[u8]) -> String {
    data.iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode a hex string, panicking on malformed input. Test-data helper only.
pub fn hex_to_bytes(hex: &str) -> Vec<u8> {
    decode_hex(hex).expect("invalid hex in test data")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_decode_roundtrip() {
        let data = vec![0x01, 0x03, 0x06, 0x00, 0x64, 0x00, 0xc8];
        let encoded = encode_hex(&data);
        assert_eq!(decode_hex(&encoded).unwrap(), data);
    }

    #[test]
    fn decode_with_whitespace() {
        let hex = "01 03 06 00 64";
        assert_eq!(decode_hex(hex).unwrap(), vec![0x01, 0x03, 0x06, 0x00, 0x64]);
    }

    #[test]
    fn format_compact() {
        assert_eq!(format_hex_compact(&[0x01, 0x03]), "01 03");
    }

    #[test]
    fn rejects_odd_length_and_empty() {
        assert!(decode_hex("").is_err());
        assert!(decode_hex("1").is_err());
    }
}
