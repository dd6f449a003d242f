//! The device catalogue: a global, immutable `prefix -> schema` registry.
//!
//! Individual device models are data, not design — adding a model means
//! adding an entry here, not a new type. [`BaseDeviceV1`]/[`BaseDeviceV2`]
//! are the generic schemas the recognizer probes with before a specific
//! model is known; named models refine them with their full field table.

use super::{DeviceSchema, EncryptionMode, IotVersion, Range};
use crate::fields::{EnumDomain, Field, FieldName};
use once_cell::sync::Lazy;

fn base_v1_fields() -> Vec<Field> {
    vec![
        Field::Str { name: FieldName::DeviceType, address: 10, size: 6 },
        Field::SerialNumber { name: FieldName::DeviceSn, address: 17 },
        Field::UInt { name: FieldName::DcInputPower, address: 36, multiplier: 1.0, min: None, max: None },
        Field::UInt { name: FieldName::AcInputPower, address: 37, multiplier: 1.0, min: None, max: None },
        Field::UInt { name: FieldName::AcOutputPower, address: 38, multiplier: 1.0, min: None, max: None },
        Field::UInt { name: FieldName::DcOutputPower, address: 39, multiplier: 1.0, min: None, max: None },
        Field::UInt { name: FieldName::TotalBatteryPercent, address: 43, multiplier: 1.0, min: Some(0), max: Some(100) },
    ]
}

fn no_writable_addresses(_addr: u16) -> bool {
    false
}

/// The generic v1 schema every v1 device starts as before a specific model
/// is recognized. Exercised directly by devices the catalogue has no named
/// entry for.
pub fn base_device_v1() -> DeviceSchema {
    DeviceSchema::new(
        IotVersion::V1,
        base_v1_fields(),
        Range::new(10, 16),
        EncryptionMode::None,
        no_writable_addresses,
    )
}

/// The generic v2 schema: same base fields, behind an encrypted session.
pub fn base_device_v2() -> DeviceSchema {
    DeviceSchema::new(
        IotVersion::V2,
        base_v1_fields(),
        Range::new(10, 16),
        EncryptionMode::Ctr,
        no_writable_addresses,
    )
}

const AC300_ECO_MODE: EnumDomain = &[0, 1, 2, 3];

fn ac300_writable(addr: u16) -> bool {
    matches!(addr, 2011 | 2015)
}

/// AC300: the reference v1 inverter/charger model, extending the base
/// fields with PV input channels and the write-capable control registers.
pub fn ac300() -> DeviceSchema {
    let mut fields = base_v1_fields();
    fields.extend([
        Field::Decimal { name: FieldName::PowerGeneration, address: 1202, size: 1, scale: 1 },
        Field::UInt { name: FieldName::PvS1Power, address: 1212, multiplier: 1.0, min: None, max: None },
        Field::UInt { name: FieldName::PvS1Voltage, address: 1213, multiplier: 0.1, min: None, max: None },
        Field::UInt { name: FieldName::PvS1Current, address: 1214, multiplier: 0.1, min: None, max: None },
        Field::UInt { name: FieldName::PvS2Power, address: 1222, multiplier: 1.0, min: None, max: None },
        Field::UInt { name: FieldName::PvS2Voltage, address: 1223, multiplier: 0.1, min: None, max: None },
        Field::UInt { name: FieldName::PvS2Current, address: 1224, multiplier: 0.1, min: None, max: None },
        Field::Switch { name: FieldName::CtrlAc, address: 2011 },
        Field::Select { name: FieldName::CtrlEcoTimeModeDc, address: 2015, domain: AC300_ECO_MODE },
    ]);
    DeviceSchema::new(IotVersion::V1, fields, Range::new(10, 16), EncryptionMode::None, ac300_writable)
}

/// EP600: v1 split-phase model; its EP600-specific PV/grid triplet is
/// modeled where the reference fixtures put it, around address 1200.
pub fn ep600() -> DeviceSchema {
    let mut fields = base_v1_fields();
    fields.extend([
        Field::Decimal { name: FieldName::PowerGeneration, address: 1202, size: 1, scale: 1 },
        Field::UInt { name: FieldName::GridFrequency, address: 1300, multiplier: 0.01, min: None, max: None },
        Field::UInt { name: FieldName::AcOutputFrequency, address: 1301, multiplier: 0.01, min: None, max: None },
    ]);
    DeviceSchema::new(IotVersion::V1, fields, Range::new(10, 16), EncryptionMode::None, no_writable_addresses)
}

/// EL30: v2 encrypted model sharing the base v1 field layout under an AES
/// session; no model-specific fields beyond the base set are documented.
pub fn el30() -> DeviceSchema {
    DeviceSchema::new(IotVersion::V2, base_v1_fields(), Range::new(10, 16), EncryptionMode::Ctr, no_writable_addresses)
}

static CATALOGUE: Lazy<Vec<(&'static str, fn() -> DeviceSchema)>> = Lazy::new(|| {
    vec![
        ("AC300", ac300 as fn() -> DeviceSchema),
        ("EP600", ep600 as fn() -> DeviceSchema),
        ("EL30", el30 as fn() -> DeviceSchema),
    ]
});

/// Look up a named model's schema by its device-type prefix, e.g. the
/// `"AC300"` decoded from a `device_type` field. Unknown prefixes fall back
/// to the caller treating the device as generic v1/v2.
pub fn lookup(device_type_prefix: &str) -> Option<DeviceSchema> {
    CATALOGUE
        .iter()
        .find(|(prefix, _)| device_type_prefix.starts_with(prefix))
        .map(|(_, ctor)| ctor())
}
