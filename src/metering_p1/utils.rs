use super::{structs::{Reading, Tariff, Timestamp}, ValueError};
use crc16::{State, ARC};
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashMap;

lazy_static! {
    /* YYMMDDhhmm, optional seconds, optional DST flag (S = summer, W = winter) */
    static ref TIMESTAMP_RE: Regex =
        Regex::new(r"^([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})([0-9]{2})(?:[0-9]{2})?[SW]?$").unwrap();

    /* Everything of one physical kind ends up in the same scale: kWh, kW, m3 */
    static ref UNIT_SCALES: HashMap<&'static str, f64> = {
        let mut map = HashMap::new();
        map.insert("kWh", 1.0);
        map.insert("Wh", 0.001);
        map.insert("kW", 1.0);
        map.insert("W", 0.001);
        map.insert("V", 1.0);
        map.insert("A", 1.0);
        map.insert("m3", 1.0);
        map.insert("s", 1.0);
        map
    };
}

fn malformed(value: &str, reason: &str) -> ValueError {
    ValueError {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

pub fn parse_identifier(value: &str) -> String {
    value.to_string()
}

pub fn parse_number(value: &str) -> Result<f64, ValueError> {
    value.trim().parse::<f64>()
        .map_err(|_| malformed(value, "not a number"))
}

/// Number in front of an optional `*unit`, the unit itself is not looked at
pub fn parse_plain_quantity(value: &str) -> Result<f64, ValueError> {
    let number = value.split('*').next().unwrap_or(value);
    parse_number(number)
}

/// `<number>*<unit>` brought to the canonical scale of its unit
pub fn parse_scaled_quantity(value: &str) -> Result<f64, ValueError> {
    let (number, unit) = value.split_once('*')
        .ok_or_else(|| malformed(value, "missing unit"))?;
    let scale = unit_scale(unit)
        .ok_or_else(|| malformed(value, "unknown unit"))?;
    Ok(parse_number(number)? * scale)
}

pub fn unit_scale(unit: &str) -> Option<f64> {
    UNIT_SCALES.get(unit).copied()
}

pub fn parse_timestamp(value: &str) -> Result<Timestamp, ValueError> {
    let caps = TIMESTAMP_RE.captures(value)
        .ok_or_else(|| malformed(value, "not a YYMMDDhhmm timestamp"))?;

    /* The regex only lets two digit groups through, parsing cannot fail */
    let field = |i: usize| caps[i].parse::<u8>().unwrap_or_default();

    Ok(Timestamp {
        year: 2000 + field(1) as u16,
        month: field(2),
        day: field(3),
        hour: field(4),
        minute: field(5),
    })
}

pub fn parse_tariff(value: &str) -> Tariff {
    match value {
        "0001" => Tariff::High,
        "0002" => Tariff::Low,
        other => Tariff::Raw(other.to_string()),
    }
}

pub fn parse_integer(value: &str) -> Result<i64, ValueError> {
    value.trim().parse::<i64>()
        .map_err(|_| malformed(value, "not an integer"))
}

/// Old style gas object: timestamp, four bookkeeping fields we do not need, unit, reading
pub fn parse_legacy_gas(args: &[&str]) -> Result<Reading, ValueError> {
    if args.len() != 7 {
        return Err(malformed(&args.join(")("), "gas reading needs 7 arguments"));
    }

    Ok(Reading {
        timestamp: parse_timestamp(args[0])?,
        value: parse_number(args[6])?,
    })
}

pub fn parse_gas(args: &[&str]) -> Result<Reading, ValueError> {
    match args {
        [timestamp, quantity] => Ok(Reading {
            timestamp: parse_timestamp(timestamp)?,
            value: parse_scaled_quantity(quantity)?,
        }),
        _ => Err(malformed(&args.join(")("), "gas reading needs 2 arguments")),
    }
}

/// Count and log OBIS code up front, then (timestamp, duration) pairs
pub fn parse_failure_log(args: &[&str]) -> Result<Vec<Reading>, ValueError> {
    if args.len() < 2 {
        return Err(malformed(&args.join(")("), "failure log header missing"));
    }

    let entries = &args[2..];
    if entries.len() % 2 != 0 {
        return Err(malformed(&args.join(")("), "failure log has an odd number of entry fields"));
    }

    entries.chunks(2)
        .map(|pair| Ok(Reading {
            timestamp: parse_timestamp(pair[0])?,
            value: parse_scaled_quantity(pair[1])?,
        }))
        .collect()
}

pub fn calculate_crc16(data: &[u8]) -> u16 {
    State::<ARC>::calculate(data)
}

/// Compares against the hex digits trailing the `!`, anything unparsable is a mismatch
pub fn verify_checksum(data: &[u8], transmitted: &str) -> Result<(), u16> {
    let computed = calculate_crc16(data);
    match u16::from_str_radix(transmitted, 16) {
        Ok(expected) if transmitted.len() == 4 && expected == computed => Ok(()),
        _ => Err(computed),
    }
}
