use rust_decimal::Decimal;

/// A decoded field value. Kept as a tagged union rather than `Box<dyn Any>`
/// so callers can match on it without downcasting.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    U16(u16),
    U64(u64),
    Decimal(Decimal),
    Bool(bool),
    Enum(u16),
    Str(String),
    /// A `Version` field's decoded decimal, e.g. `1028.06`.
    Version(Decimal),
}

impl Value {
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            Value::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(v) => Some(v.as_str()),
            _ => None,
        }
    }
}
