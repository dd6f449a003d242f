//! The register/field model: a tagged variant over the field kinds a
//! [`crate::schema::DeviceSchema`] can describe, each with a uniform
//! `decode(&[u8]) -> Option<Value>` contract. Unknown/out-of-domain bytes
//! are a *decode miss* (`None`), never a panic and never a default value.

pub mod name;
pub mod value;

pub use name::FieldName;
pub use value::Value;

use rust_decimal::Decimal;

/// A closed set of raw register codes an `Enum`/`Select` field accepts.
pub type EnumDomain = &'static [u16];

#[derive(Debug, Clone)]
pub enum Field {
    UInt {
        name: FieldName,
        address: u16,
        multiplier: f64,
        min: Option<i64>,
        max: Option<i64>,
    },
    Decimal {
        name: FieldName,
        address: u16,
        size: u16,
        scale: u32,
    },
    Bool {
        name: FieldName,
        address: u16,
    },
    Switch {
        name: FieldName,
        address: u16,
    },
    BoolNonZero {
        name: FieldName,
        address: u16,
    },
    Enum {
        name: FieldName,
        address: u16,
        domain: EnumDomain,
    },
    Select {
        name: FieldName,
        address: u16,
        domain: EnumDomain,
    },
    Str {
        name: FieldName,
        address: u16,
        size: u16,
    },
    SerialNumber {
        name: FieldName,
        address: u16,
    },
    Version {
        name: FieldName,
        address: u16,
    },
}

impl Field {
    pub fn name(&self) -> FieldName {
        match self {
            Field::UInt { name, .. }
            | Field::Decimal { name, .. }
            | Field::Bool { name, .. }
            | Field::Switch { name, .. }
            | Field::BoolNonZero { name, .. }
            | Field::Enum { name, .. }
            | Field::Select { name, .. }
            | Field::Str { name, .. }
            | Field::SerialNumber { name, .. }
            | Field::Version { name, .. } => *name,
        }
    }

    pub fn address(&self) -> u16 {
        match self {
            Field::UInt { address, .. }
            | Field::Decimal { address, .. }
            | Field::Bool { address, .. }
            | Field::Switch { address, .. }
            | Field::BoolNonZero { address, .. }
            | Field::Enum { address, .. }
            | Field::Select { address, .. }
            | Field::Str { address, .. }
            | Field::SerialNumber { address, .. }
            | Field::Version { address, .. } => *address,
        }
    }

    /// Register count this field occupies. Immutable for the field's lifetime.
    pub fn size(&self) -> u16 {
        match self {
            Field::UInt { .. } | Field::Bool { .. } | Field::Switch { .. } | Field::BoolNonZero { .. } => 1,
            Field::Enum { .. } | Field::Select { .. } => 1,
            Field::Decimal { size, .. } => *size,
            Field::Str { size, .. } => *size,
            Field::SerialNumber { .. } => 4,
            Field::Version { .. } => 2,
        }
    }

    pub fn is_writeable(&self) -> bool {
        matches!(self, Field::Switch { .. } | Field::Select { .. })
    }

    /// Decode the exact `2 * size()` byte slice for this field. Returns
    /// `None` on any bounded-domain failure instead of panicking.
    pub fn decode(&self, data: &[u8]) -> Option<Value> {
        if data.len() != 2 * self.size() as usize {
            return None;
        }
        match self {
            Field::UInt { multiplier, .. } => {
                let raw = u16::from_be_bytes([data[0], data[1]]);
                if (*multiplier - 1.0).abs() < f64::EPSILON {
                    Some(Value::U16(raw))
                } else {
                    let scaled = (raw as f64 * multiplier * 100.0).round() / 100.0;
                    Some(Value::Decimal(Decimal::from_f64_retain(scaled)?))
                }
            }
            Field::Decimal { scale, .. } => {
                let raw: u32 = data.iter().fold(0u32, |acc, &b| (acc << 8) | b as u32);
                if *scale == 0 {
                    Some(Value::U16(raw.min(u16::MAX as u32) as u16))
                } else {
                    let divisor = 10i64.pow(*scale);
                    Some(Value::Decimal(Decimal::new(raw as i64, 0) / Decimal::new(divisor, 0)))
                }
            }
            Field::Bool { .. } => match u16::from_be_bytes([data[0], data[1]]) {
                0 => Some(Value::Bool(false)),
                1 => Some(Value::Bool(true)),
                _ => None,
            },
            Field::Switch { .. } => match u16::from_be_bytes([data[0], data[1]]) {
                0 => Some(Value::Bool(false)),
                1 => Some(Value::Bool(true)),
                _ => None,
            },
            Field::BoolNonZero { .. } => {
                let raw = u16::from_be_bytes([data[0], data[1]]);
                Some(Value::Bool(raw != 0))
            }
            Field::Enum { domain, .. } | Field::Select { domain, .. } => {
                let raw = u16::from_be_bytes([data[0], data[1]]);
                if domain.contains(&raw) {
                    Some(Value::Enum(raw))
                } else {
                    None
                }
            }
            Field::Str { .. } => {
                let end = data.iter().position(|&b| b == 0).unwrap_or(data.len());
                let trimmed = std::str::from_utf8(&data[..end]).ok()?.trim_end();
                Some(Value::Str(trimmed.to_string()))
            }
            Field::SerialNumber { .. } => Some(Value::U64(combine_words_le(data))),
            Field::Version { .. } => Some(Value::Version(Decimal::new(combine_words_le(data) as i64, 2))),
        }
    }

    /// Encode a value for a writable field. `None` means the value's type or
    /// domain does not match this field's declared write contract.
    pub fn allowed_write_type(&self, value: &Value) -> bool {
        match self {
            Field::Switch { .. } => matches!(value, Value::Bool(_)),
            Field::Select { domain, .. } => matches!(value, Value::Enum(raw) if domain.contains(raw)),
            _ => false,
        }
    }

    /// Produce the register bytes to write for an accepted value. Caller
    /// must have already checked [`Field::allowed_write_type`].
    pub fn encode(&self, value: &Value) -> Option<Vec<u8>> {
        if !self.allowed_write_type(value) {
            return None;
        }
        match (self, value) {
            (Field::Switch { .. }, Value::Bool(b)) => Some(vec![0, if *b { 1 } else { 0 }]),
            (Field::Select { .. }, Value::Enum(raw)) => Some(raw.to_be_bytes().to_vec()),
            _ => None,
        }
    }

    /// Whether a decoded `UInt` reading falls within the field's declared
    /// bounds. Unbounded sides always pass; out-of-range readings still
    /// decode successfully, matching the source's "parse always succeeds,
    /// range is a separate check" split.
    pub fn in_range(&self, value: i64) -> bool {
        match self {
            Field::UInt { min, max, .. } => in_range(value, *min, *max),
            _ => true,
        }
    }
}

fn in_range(v: i64, min: Option<i64>, max: Option<i64>) -> bool {
    min.map(|m| v >= m).unwrap_or(true) && max.map(|m| v <= m).unwrap_or(true)
}

/// Combine consecutive big-endian register words into one integer, register
/// 0 (the first two bytes) holding the least-significant 16 bits. Used by
/// multi-register fields (`SerialNumber`, `Version`) whose registers are
/// ordered little-endian relative to each other, each register itself
/// big-endian.
fn combine_words_le(data: &[u8]) -> u64 {
    data.chunks_exact(2)
        .enumerate()
        .fold(0u64, |acc, (i, word)| {
            let value = u16::from_be_bytes([word[0], word[1]]) as u64;
            acc + (value << (16 * i))
        })
}
