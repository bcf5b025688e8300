use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref OBIS_DESCRIPTIONS: HashMap<&'static str, &'static str> = get_standard_obis_descriptions();
}

pub fn get_obis_description(obis_code: &str) -> Option<&'static str> {
    OBIS_DESCRIPTIONS.get(obis_code).copied()
}

/// Human readable names for codes seen on P1 ports, decoded or not
fn get_standard_obis_descriptions() -> HashMap<&'static str, &'static str> {
    let mut map = HashMap::new();

    // Meter
    map.insert("1-3:0.2.8", "DSMR version");
    map.insert("0-0:1.0.0", "Date and time");
    map.insert("0-0:96.1.1", "Equipment identifier");
    map.insert("0-0:96.3.10", "Breaker state");
    map.insert("0-0:17.0.0", "Power threshold");
    map.insert("0-0:96.14.0", "Tariff indicator");
    map.insert("0-0:96.13.0", "Text message");
    map.insert("0-0:96.13.1", "Numeric message");

    // Energy values
    map.insert("1-0:1.8.0", "Active energy + (total)");
    map.insert("1-0:1.8.1", "Active energy + (tariff 1)");
    map.insert("1-0:1.8.2", "Active energy + (tariff 2)");
    map.insert("1-0:2.8.0", "Active energy - (total)");
    map.insert("1-0:2.8.1", "Active energy - (tariff 1)");
    map.insert("1-0:2.8.2", "Active energy - (tariff 2)");

    // Power values
    map.insert("1-0:1.7.0", "Active power + (total)");
    map.insert("1-0:2.7.0", "Active power - (total)");
    map.insert("1-0:21.7.0", "Active power + (L1)");
    map.insert("1-0:41.7.0", "Active power + (L2)");
    map.insert("1-0:61.7.0", "Active power + (L3)");
    map.insert("1-0:22.7.0", "Active power - (L1)");
    map.insert("1-0:42.7.0", "Active power - (L2)");
    map.insert("1-0:62.7.0", "Active power - (L3)");

    // Voltage and current
    map.insert("1-0:32.7.0", "Voltage (L1)");
    map.insert("1-0:52.7.0", "Voltage (L2)");
    map.insert("1-0:72.7.0", "Voltage (L3)");
    map.insert("1-0:31.7.0", "Current (L1)");
    map.insert("1-0:51.7.0", "Current (L2)");
    map.insert("1-0:71.7.0", "Current (L3)");
    map.insert("1-0:14.7.0", "Supply frequency");

    // Power quality
    map.insert("0-0:96.7.21", "Number of power failures");
    map.insert("0-0:96.7.9", "Number of long power failures");
    map.insert("0-0:96.7.19", "Long power failure event log");
    map.insert("1-0:99.97.0", "Power failure event log");
    map.insert("1-0:32.32.0", "Number of voltage sags (L1)");
    map.insert("1-0:52.32.0", "Number of voltage sags (L2)");
    map.insert("1-0:72.32.0", "Number of voltage sags (L3)");
    map.insert("1-0:32.36.0", "Number of voltage swells (L1)");
    map.insert("1-0:52.36.0", "Number of voltage swells (L2)");
    map.insert("1-0:72.36.0", "Number of voltage swells (L3)");

    // M-Bus devices
    map.insert("0-1:24.1.0", "M-Bus device type");
    map.insert("0-1:96.1.0", "M-Bus equipment identifier");
    map.insert("0-1:24.2.1", "M-Bus last reading");
    map.insert("0-1:24.3.0", "M-Bus profile (DSMR 3)");
    map.insert("0-1:24.4.0", "M-Bus valve position");
    map.insert("0-2:24.1.0", "M-Bus device type (channel 2)");
    map.insert("0-2:96.1.0", "M-Bus equipment identifier (channel 2)");
    map.insert("0-2:24.2.1", "M-Bus last reading (channel 2)");

    map
}

pub fn validate_obis_code(code: &str) -> bool {
    // OBIS code format: A-B:C.D.E*F
    // A: Medium (0=abstract, 1=electricity, 6=heat, 7=gas, 8=water)
    // B: Channel (0-64)
    // C: Physical value
    // D: Processing method
    // E: Tariff/Time
    // F: Storage (optional)

    let (ab_part, cde_part) = match code.split_once(':') {
        Some(parts) => parts,
        None => return false,
    };

    let ab_parts: Vec<&str> = ab_part.split('-').collect();
    if ab_parts.len() != 2 {
        return false;
    }

    let cde_part = cde_part.split('*').next().unwrap_or("");
    let cde_parts: Vec<&str> = cde_part.split('.').collect();
    if cde_parts.len() != 3 {
        return false;
    }

    ab_parts.iter()
        .chain(cde_parts.iter())
        .all(|part| part.parse::<u8>().is_ok())
}
