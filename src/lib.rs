//! Smart meter P1 port reader
//!
//! This library reads DSMR telegrams from a meter's P1 port, verifies them
//! and decodes the OBIS data objects into named, typed values.

pub mod config;
pub mod metering_p1;
pub mod obis_utils;
pub mod report;

// Re-export common types for easier access
pub use config::Config;
pub use metering_p1::{Meter, MeterState, P1Error, Protocol};
pub use metering_p1::structs::{Reading, Tariff, Telegram, Timestamp, Value};
