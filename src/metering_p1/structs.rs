use chrono::{NaiveDate, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Minute resolution timestamp as sent by the meter (seconds and DST flag dropped)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct Timestamp {
    pub year: u16,
    pub month: u8,
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl Timestamp {
    pub fn new(year: u16, month: u8, day: u8, hour: u8, minute: u8) -> Self {
        Self { year, month, day, hour, minute }
    }

    pub fn as_tuple(&self) -> (u16, u8, u8, u8, u8) {
        (self.year, self.month, self.day, self.hour, self.minute)
    }

    /// None if the meter sent an impossible calendar value
    pub fn to_naive(&self) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(self.year as i32, self.month as u32, self.day as u32)?
            .and_hms_opt(self.hour as u32, self.minute as u32, 0)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02} {:02}:{:02}",
               self.year, self.month, self.day, self.hour, self.minute)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Tariff {
    Low,
    High,
    Raw(String),
}

impl Tariff {
    pub fn as_str(&self) -> &str {
        match self {
            Tariff::Low => "low",
            Tariff::High => "high",
            Tariff::Raw(code) => code,
        }
    }
}

impl Serialize for Tariff {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl fmt::Display for Tariff {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A quantity stamped with the moment it was measured (gas, failure log entries)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reading {
    pub timestamp: Timestamp,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Quantity(f64),
    Count(i64),
    Timestamp(Timestamp),
    Tariff(Tariff),
    Reading(Reading),
    Log(Vec<Reading>),
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_quantity(&self) -> Option<f64> {
        match self {
            Value::Quantity(q) => Some(*q),
            _ => None,
        }
    }

    pub fn as_count(&self) -> Option<i64> {
        match self {
            Value::Count(c) => Some(*c),
            _ => None,
        }
    }

    pub fn as_timestamp(&self) -> Option<Timestamp> {
        match self {
            Value::Timestamp(t) => Some(*t),
            _ => None,
        }
    }

    pub fn as_tariff(&self) -> Option<&Tariff> {
        match self {
            Value::Tariff(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_reading(&self) -> Option<Reading> {
        match self {
            Value::Reading(r) => Some(*r),
            _ => None,
        }
    }

    pub fn as_log(&self) -> Option<&[Reading]> {
        match self {
            Value::Log(l) => Some(l),
            _ => None,
        }
    }
}

/// One decoded meter transmission
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct Telegram {
    pub header_marker: String,
    pub header_id: String,
    pub fields: BTreeMap<String, Value>,
}

impl Telegram {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    pub fn quantity(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(Value::as_quantity)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Framed but not yet decoded telegram, data lines already continuation merged
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTelegram {
    pub header_marker: String,
    pub header_id: String,
    pub lines: Vec<String>,
}
