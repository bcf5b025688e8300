use super::{structs::Value, utils, Protocol, ValueError};
use lazy_static::lazy_static;
use std::collections::HashMap;

/// How the arguments of a data object turn into a value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Converter {
    Identifier,
    /// Number only, unit ignored (DSMR 3)
    PlainQuantity,
    /// Number scaled by its unit (DSMR 4)
    ScaledQuantity,
    Timestamp,
    Tariff,
    Integer,
    LegacyGas,
    Gas,
    FailureLog,
}

impl Converter {
    pub fn apply(&self, args: &[&str]) -> Result<Value, ValueError> {
        match self {
            Converter::Identifier => Ok(Value::Text(utils::parse_identifier(single(args)?))),
            Converter::PlainQuantity => Ok(Value::Quantity(utils::parse_plain_quantity(single(args)?)?)),
            Converter::ScaledQuantity => Ok(Value::Quantity(utils::parse_scaled_quantity(single(args)?)?)),
            Converter::Timestamp => Ok(Value::Timestamp(utils::parse_timestamp(single(args)?)?)),
            Converter::Tariff => Ok(Value::Tariff(utils::parse_tariff(single(args)?))),
            Converter::Integer => Ok(Value::Count(utils::parse_integer(single(args)?)?)),
            Converter::LegacyGas => Ok(Value::Reading(utils::parse_legacy_gas(args)?)),
            Converter::Gas => Ok(Value::Reading(utils::parse_gas(args)?)),
            Converter::FailureLog => Ok(Value::Log(utils::parse_failure_log(args)?)),
        }
    }
}

fn single<'a>(args: &[&'a str]) -> Result<&'a str, ValueError> {
    match args {
        [arg] => Ok(*arg),
        _ => Err(ValueError {
            value: args.join(")("),
            reason: format!("expected a single argument, got {}", args.len()),
        }),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObisEntry {
    pub name: &'static str,
    pub converter: Converter,
}

pub type Registry = HashMap<&'static str, ObisEntry>;

fn entry(name: &'static str, converter: Converter) -> ObisEntry {
    ObisEntry { name, converter }
}

lazy_static! {
    pub static ref DSMR3_OBIS: Registry = get_dsmr3_definition();
    pub static ref DSMR4_OBIS: Registry = get_dsmr4_definition();
}

pub fn get_registry(protocol: Protocol) -> &'static Registry {
    match protocol {
        Protocol::Dsmr3 => &DSMR3_OBIS,
        Protocol::Dsmr4 => &DSMR4_OBIS,
    }
}

pub fn lookup(protocol: Protocol, obis: &str) -> Option<&'static ObisEntry> {
    get_registry(protocol).get(obis)
}

fn get_dsmr3_definition() -> Registry {
    use Converter::*;
    let mut map = HashMap::new();

    // Electricity
    map.insert("0-0:96.1.1", entry("id", Identifier));
    map.insert("1-0:1.8.1", entry("kWh", PlainQuantity));
    map.insert("1-0:1.8.2", entry("kWh-low", PlainQuantity));
    map.insert("1-0:2.8.1", entry("kWh-out", PlainQuantity));
    map.insert("1-0:2.8.2", entry("kWh-out-low", PlainQuantity));
    map.insert("0-0:96.14.0", entry("tariff", Tariff));
    map.insert("1-0:1.7.0", entry("W", PlainQuantity));
    map.insert("1-0:2.7.0", entry("W-out", PlainQuantity));
    map.insert("0-0:17.0.0", entry("treshold", PlainQuantity));
    map.insert("0-0:96.3.10", entry("switch", Identifier));
    map.insert("0-0:96.13.1", entry("msg-numeric", Identifier));
    map.insert("0-0:96.13.0", entry("msg-txt", Identifier));

    // Gas meter on M-Bus channel 1
    map.insert("0-1:24.1.0", entry("type", Identifier));
    map.insert("0-1:96.1.0", entry("id-gas", Identifier));
    map.insert("0-1:24.3.0", entry("gas", LegacyGas));
    map.insert("0-1:24.4.0", entry("gas-switch", Identifier));

    map
}

fn get_dsmr4_definition() -> Registry {
    use Converter::*;
    let mut map = HashMap::new();

    map.insert("1-3:0.2.8", entry("version", Identifier));
    map.insert("0-0:1.0.0", entry("timestamp", Timestamp));

    // Electricity
    map.insert("0-0:96.1.1", entry("id", Identifier));
    map.insert("1-0:1.8.1", entry("kWh", ScaledQuantity));
    map.insert("1-0:1.8.2", entry("kWh-low", ScaledQuantity));
    map.insert("1-0:2.8.1", entry("kWh-out", ScaledQuantity));
    map.insert("1-0:2.8.2", entry("kWh-out-low", ScaledQuantity));
    map.insert("0-0:96.14.0", entry("tariff", Tariff));
    map.insert("1-0:1.7.0", entry("W", ScaledQuantity));
    map.insert("1-0:2.7.0", entry("W-out", ScaledQuantity));
    map.insert("0-0:17.0.0", entry("treshold", ScaledQuantity));
    map.insert("0-0:96.3.10", entry("switch", Identifier));
    map.insert("0-0:96.13.1", entry("msg-numeric", Identifier));
    map.insert("0-0:96.13.0", entry("msg-txt", Identifier));

    // Power quality events
    map.insert("0-0:96.7.21", entry("power-failures", Integer));
    map.insert("0-0:96.7.9", entry("long-power-failures", Integer));
    map.insert("1-0:99.97.0", entry("power-failure-log", FailureLog));
    map.insert("1-0:32.32.0", entry("voltage-sags-l1", Integer));
    map.insert("1-0:52.32.0", entry("voltage-sags-l2", Integer));
    map.insert("1-0:72.32.0", entry("voltage-sags-l3", Integer));
    map.insert("1-0:32.36.0", entry("voltage-swells-l1", Integer));
    map.insert("1-0:52.36.0", entry("voltage-swells-l2", Integer));
    map.insert("1-0:72.36.0", entry("voltage-swells-l3", Integer));

    // Per phase measurements
    map.insert("1-0:32.7.0", entry("V-l1", ScaledQuantity));
    map.insert("1-0:52.7.0", entry("V-l2", ScaledQuantity));
    map.insert("1-0:72.7.0", entry("V-l3", ScaledQuantity));
    map.insert("1-0:31.7.0", entry("A-l1", ScaledQuantity));
    map.insert("1-0:51.7.0", entry("A-l2", ScaledQuantity));
    map.insert("1-0:71.7.0", entry("A-l3", ScaledQuantity));
    map.insert("1-0:21.7.0", entry("W-l1", ScaledQuantity));
    map.insert("1-0:41.7.0", entry("W-l2", ScaledQuantity));
    map.insert("1-0:61.7.0", entry("W-l3", ScaledQuantity));
    map.insert("1-0:22.7.0", entry("W-out-l1", ScaledQuantity));
    map.insert("1-0:42.7.0", entry("W-out-l2", ScaledQuantity));
    map.insert("1-0:62.7.0", entry("W-out-l3", ScaledQuantity));

    // Gas meter on M-Bus channel 1
    map.insert("0-1:24.1.0", entry("type", Identifier));
    map.insert("0-1:96.1.0", entry("id-gas", Identifier));
    map.insert("0-1:24.2.1", entry("gas", Gas));
    map.insert("0-1:24.4.0", entry("gas-switch", Identifier));

    map
}
