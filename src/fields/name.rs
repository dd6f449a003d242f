//! The closed set of semantic field identifiers used as output map keys.

/// Stable semantic identifier for a decoded value. `as_str()` is the string
/// key callers see in the decoded output map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum FieldName {
    DeviceType,
    DeviceSn,
    TotalBatteryPercent,
    AcInputPower,
    AcInputVoltage,
    AcOutputPower,
    DcInputPower,
    DcOutputPower,
    CtrlAc,
    CtrlEcoTimeModeDc,
    PowerGeneration,
    PvS1Power,
    PvS1Voltage,
    PvS1Current,
    PvS2Power,
    PvS2Voltage,
    PvS2Current,
    GridFrequency,
    AcOutputFrequency,
    TimeRemaining,
    DcOutputPowerScaled,
}

impl FieldName {
    pub const fn as_str(self) -> &'static str {
        match self {
            FieldName::DeviceType => "device_type",
            FieldName::DeviceSn => "device_sn",
            FieldName::TotalBatteryPercent => "total_battery_percent",
            FieldName::AcInputPower => "ac_input_power",
            FieldName::AcInputVoltage => "ac_input_voltage",
            FieldName::AcOutputPower => "ac_output_power",
            FieldName::DcInputPower => "dc_input_power",
            FieldName::DcOutputPower => "dc_output_power",
            FieldName::CtrlAc => "ctrl_ac",
            FieldName::CtrlEcoTimeModeDc => "ctrl_eco_time_mode_dc",
            FieldName::PowerGeneration => "power_generation",
            FieldName::PvS1Power => "pv_s1_power",
            FieldName::PvS1Voltage => "pv_s1_voltage",
            FieldName::PvS1Current => "pv_s1_current",
            FieldName::PvS2Power => "pv_s2_power",
            FieldName::PvS2Voltage => "pv_s2_voltage",
            FieldName::PvS2Current => "pv_s2_current",
            FieldName::GridFrequency => "grid_frequency",
            FieldName::AcOutputFrequency => "ac_output_frequency",
            FieldName::TimeRemaining => "time_remaining",
            FieldName::DcOutputPowerScaled => "dc_output_power_scaled",
        }
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_python_original_keys() {
        assert_eq!(FieldName::DeviceType.as_str(), "device_type");
        assert_eq!(FieldName::TotalBatteryPercent.as_str(), "total_battery_percent");
        assert_eq!(FieldName::AcOutputPower.as_str(), "ac_output_power");
    }
}
