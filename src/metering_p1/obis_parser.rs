use super::{meter_definitions, structs::{RawTelegram, Telegram}, P1Error, Protocol};
use crate::obis_utils;
use log::{debug, warn};

/// Splits `1-0:1.8.1(001234.567*kWh)` into the OBIS code and its argument list
pub fn split_data_line(line: &str) -> Result<(&str, Vec<&str>), P1Error> {
    // Example formats:
    // 1-0:1.8.1(001234.567*kWh)
    // 0-1:24.2.1(101209110000W)(12785.123*m3)
    // 0-0:96.13.0()

    let (obis, rest) = match line.split_once('(') {
        Some((obis, rest)) => (obis, Some(rest)),
        None => (line, None),
    };

    let mut args = Vec::new();
    if let Some(rest) = rest {
        for bit in rest.split('(') {
            let arg = bit.strip_suffix(')')
                .ok_or_else(|| P1Error::MalformedArgument { line: line.to_string() })?;
            args.push(arg);
        }
    }

    Ok((obis, args))
}

pub fn decode_telegram(raw: &RawTelegram, protocol: Protocol) -> Result<Telegram, P1Error> {
    let mut telegram = Telegram {
        header_marker: raw.header_marker.clone(),
        header_id: raw.header_id.clone(),
        ..Default::default()
    };

    for line in &raw.lines {
        if line.is_empty() {
            continue;
        }

        let (obis, args) = split_data_line(line)?;

        let entry = match meter_definitions::lookup(protocol, obis) {
            Some(entry) => entry,
            None => {
                match obis_utils::get_obis_description(obis) {
                    Some(description) => warn!("Unknown data object with OBIS {:?} ({})", obis, description),
                    None if !obis_utils::validate_obis_code(obis) => warn!("Unknown data object {:?}, not an OBIS code", line),
                    None => warn!("Unknown data object with OBIS {:?}", obis),
                }
                continue;
            }
        };

        let value = entry.converter.apply(&args).map_err(|source| P1Error::MalformedValue {
            field: entry.name.to_string(),
            obis: obis.to_string(),
            source,
        })?;

        debug!("Parsed OBIS line - Code: {}, Field: {}, Value: {:?}", obis, entry.name, value);
        telegram.fields.insert(entry.name.to_string(), value);
    }

    Ok(telegram)
}
