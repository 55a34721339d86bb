//! Built-in device categories and their extraction tables.

use serde_json::Value;
use std::net::IpAddr;

use crate::bim::Element;
use crate::synthesis::record::DeviceRecord;
use crate::synthesis::schema::{DeviceCategory, DeviceSchema, FieldDefault, FieldSpec, Shape};

/// Fields shared by driver categories (led, blind, sensor, hvac)
pub const DRIVER_BASE: &[FieldSpec] = &[
    FieldSpec::new("group", &["Group"], FieldDefault::Integer(0)),
    FieldSpec::new("friendlyName", &["FriendlyName"], FieldDefault::Label),
    FieldSpec::new("dumpFrequency", &["DumpFrequency"], FieldDefault::Integer(1000)),
    FieldSpec::new("modbusID", &["ModbusID"], FieldDefault::BusAddress),
];

/// Short-range radio beacon fields of led, blind and sensor drivers
pub const BEACON: &[FieldSpec] = &[
    FieldSpec::new("bleMode", &["BleMode"], FieldDefault::Text("service")),
    FieldSpec::new("iBeaconUUID", &["IBeaconUUID"], FieldDefault::Text("")),
    FieldSpec::new("iBeaconMajor", &["IBeaconMajor"], FieldDefault::Integer(0)),
    FieldSpec::new("iBeaconMinor", &["IBeaconMinor"], FieldDefault::Integer(0)),
    FieldSpec::new("iBeaconTxPower", &["IBeaconTxPower"], FieldDefault::Integer(0)),
];

const LED_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("pMax", &["Power", "PMax"], FieldDefault::Integer(0)),
    FieldSpec::new("defaultSetpoint", &["DefaultSetpoint"], FieldDefault::Integer(5)),
    FieldSpec::new("firstDay", &["FirstDay"], FieldDefault::Bool(false)),
    FieldSpec::new("slopeStartManual", &["SlopeStartManual"], FieldDefault::Integer(10)),
    FieldSpec::new("slopeStopManual", &["SlopeStopManual"], FieldDefault::Integer(10)),
    FieldSpec::new("slopeStartAuto", &["SlopeStartAuto"], FieldDefault::Integer(10)),
    FieldSpec::new("slopeStopAuto", &["SlopeStopAuto"], FieldDefault::Integer(10)),
];

const SENSOR_FIELDS: &[FieldSpec] = &[
    FieldSpec::new(
        "thresoldPresence",
        &["ThresholdPresence", "ThresoldPresence"],
        FieldDefault::Integer(10),
    ),
    FieldSpec::new("temperatureOffset", &["TemperatureOffset"], FieldDefault::Integer(0)),
    FieldSpec::new(
        "brightnessCorrectionFactor",
        &["BrightnessCorrectionFactor"],
        FieldDefault::Integer(1),
    ),
];

// Setpoints are in tenths of a degree.
const HVAC_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("setpointCoolOccupied", &["SetpointCoolOccupied"], FieldDefault::Integer(190)),
    FieldSpec::new("setpointHeatOccupied", &["SetpointHeatOccupied"], FieldDefault::Integer(260)),
    FieldSpec::new(
        "setpointCoolUnoccupied",
        &["SetpointCoolUnoccupied", "SetpointCoolInoccupied"],
        FieldDefault::Integer(300),
    ),
    FieldSpec::new(
        "setpointHeatUnoccupied",
        &["SetpointHeatUnoccupied", "SetpointHeatInoccupied"],
        FieldDefault::Integer(150),
    ),
    FieldSpec::new("setpointCoolStandby", &["SetpointCoolStandby"], FieldDefault::Integer(300)),
    FieldSpec::new("setpointHeatStandby", &["SetpointHeatStandby"], FieldDefault::Integer(170)),
    FieldSpec::new("ioMapping", &["IOMapping", "IoMapping"], FieldDefault::Table),
];

const SWITCH_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("friendlyName", &["FriendlyName"], FieldDefault::Label),
    FieldSpec::new("ip", &["IP", "IPAddress"], FieldDefault::Text("")),
    FieldSpec::new("cluster", &["Cluster"], FieldDefault::Integer(0)),
    FieldSpec::new("dumpFrequency", &["DumpFrequency"], FieldDefault::Integer(1000)),
    FieldSpec::new("modbusID", &["ModbusID"], FieldDefault::BusAddress),
    FieldSpec::new("api", &["API"], FieldDefault::Descriptor),
];

const FRAME_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("friendlyName", &["FriendlyName"], FieldDefault::Label),
    FieldSpec::new("cluster", &["Cluster"], FieldDefault::Integer(0)),
    FieldSpec::new("modbusID", &["ModbusID"], FieldDefault::BusAddress),
];

const WAGO_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("friendlyName", &["FriendlyName"], FieldDefault::Label),
    FieldSpec::new("ip", &["IP", "IPAddress"], FieldDefault::Text("")),
    FieldSpec::new("cluster", &["Cluster"], FieldDefault::Integer(0)),
    FieldSpec::new("slaveID", &["SlaveID"], FieldDefault::Integer(0)),
    FieldSpec::new("dumpFrequency", &["DumpFrequency"], FieldDefault::Integer(1000)),
    FieldSpec::new("api", &["API"], FieldDefault::Descriptor),
];

const NANOSENSE_FIELDS: &[FieldSpec] = &[
    FieldSpec::new("friendlyName", &["FriendlyName"], FieldDefault::Label),
    FieldSpec::new("group", &["Group"], FieldDefault::Integer(0)),
    FieldSpec::new("ip", &["IP", "IPAddress"], FieldDefault::Text("")),
    FieldSpec::new("cluster", &["Cluster"], FieldDefault::Integer(0)),
    FieldSpec::new("dumpFrequency", &["DumpFrequency"], FieldDefault::Integer(1000)),
    FieldSpec::new("api", &["API"], FieldDefault::Descriptor),
];

pub struct LedSchema;
pub struct BlindSchema;
pub struct HvacSchema;
pub struct SensorSchema;
pub struct SwitchSchema;
pub struct WagoSchema;
pub struct NanosenseSchema;
pub struct FrameSchema;

/// Every built-in schema, in document order of their buckets.
pub static ALL: &[&dyn DeviceSchema] = &[
    &LedSchema,
    &BlindSchema,
    &SensorSchema,
    &HvacSchema,
    &FrameSchema,
    &SwitchSchema,
    &WagoSchema,
    &NanosenseSchema,
];

impl DeviceSchema for LedSchema {
    fn category(&self) -> DeviceCategory {
        DeviceCategory::Led
    }

    fn shape(&self) -> Shape {
        Shape::Driver { beacon: true }
    }

    fn default_protocol(&self) -> &'static str {
        "mqtts"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        LED_FIELDS
    }

    fn extend(&self, _element: &Element, record: &mut DeviceRecord) {
        clamp_field(record, "defaultSetpoint", 0, 100);
        clamp_field(record, "pMax", 0, i64::MAX);
    }
}

impl DeviceSchema for BlindSchema {
    fn category(&self) -> DeviceCategory {
        DeviceCategory::Blind
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["bld"]
    }

    fn shape(&self) -> Shape {
        Shape::Driver { beacon: true }
    }

    fn default_protocol(&self) -> &'static str {
        "mqtts"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        &[]
    }
}

impl DeviceSchema for SensorSchema {
    fn category(&self) -> DeviceCategory {
        DeviceCategory::Sensor
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["mca"]
    }

    fn shape(&self) -> Shape {
        Shape::Driver { beacon: true }
    }

    fn default_protocol(&self) -> &'static str {
        "mqtts"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        SENSOR_FIELDS
    }

    fn extend(&self, _element: &Element, record: &mut DeviceRecord) {
        clamp_field(record, "thresoldPresence", 0, i64::MAX);
    }
}

impl DeviceSchema for HvacSchema {
    fn category(&self) -> DeviceCategory {
        DeviceCategory::Hvac
    }

    fn shape(&self) -> Shape {
        Shape::Driver { beacon: false }
    }

    fn default_protocol(&self) -> &'static str {
        "mqtts"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        HVAC_FIELDS
    }

    fn extend(&self, _element: &Element, record: &mut DeviceRecord) {
        if let Some(Value::Object(mapping)) = record.fields.get_mut("ioMapping") {
            mapping.retain(|channel, signal| {
                !channel.trim().is_empty() && signal.as_str().is_some_and(|s| !s.is_empty())
            });
        }
    }
}

impl DeviceSchema for SwitchSchema {
    fn category(&self) -> DeviceCategory {
        DeviceCategory::Switch
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["swh"]
    }

    fn shape(&self) -> Shape {
        Shape::Bespoke
    }

    fn default_protocol(&self) -> &'static str {
        "rest"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        SWITCH_FIELDS
    }

    fn extend(&self, _element: &Element, record: &mut DeviceRecord) {
        normalize_network_address(record);
    }
}

impl DeviceSchema for WagoSchema {
    fn category(&self) -> DeviceCategory {
        DeviceCategory::Wago
    }

    fn shape(&self) -> Shape {
        Shape::Bespoke
    }

    fn default_protocol(&self) -> &'static str {
        "modbus"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        WAGO_FIELDS
    }

    fn extend(&self, _element: &Element, record: &mut DeviceRecord) {
        normalize_network_address(record);
        clamp_field(record, "slaveID", 0, 255);
    }
}

impl DeviceSchema for NanosenseSchema {
    fn category(&self) -> DeviceCategory {
        DeviceCategory::Nanosense
    }

    fn shape(&self) -> Shape {
        Shape::Bespoke
    }

    fn default_protocol(&self) -> &'static str {
        "modbus"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        NANOSENSE_FIELDS
    }

    fn extend(&self, _element: &Element, record: &mut DeviceRecord) {
        normalize_network_address(record);
    }
}

impl DeviceSchema for FrameSchema {
    fn category(&self) -> DeviceCategory {
        DeviceCategory::Frame
    }

    fn aliases(&self) -> &'static [&'static str] {
        &["fra"]
    }

    fn shape(&self) -> Shape {
        Shape::Bespoke
    }

    fn default_protocol(&self) -> &'static str {
        "rest"
    }

    fn fields(&self) -> &'static [FieldSpec] {
        FRAME_FIELDS
    }

    fn extend(&self, _element: &Element, record: &mut DeviceRecord) {
        clamp_field(record, "cluster", 0, i64::MAX);
    }
}

fn clamp_field(record: &mut DeviceRecord, field: &str, min: i64, max: i64) {
    if let Some(value) = record.integer(field) {
        let clamped = value.clamp(min, max);
        if clamped != value {
            log::debug!(
                "{}: {} = {} out of range, using {}",
                record.label,
                field,
                value,
                clamped
            );
            record.set(field, clamped);
        }
    }
}

/// Blanks addresses that do not parse and clamps the cluster number.
fn normalize_network_address(record: &mut DeviceRecord) {
    if let Some(raw) = record.text("ip") {
        if !raw.is_empty() && raw.parse::<IpAddr>().is_err() {
            log::debug!("{}: ignoring invalid ip '{}'", record.label, raw);
            record.set("ip", "");
        }
    }
    clamp_field(record, "cluster", 0, i64::MAX);
}
