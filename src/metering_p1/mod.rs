use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use thiserror::Error;

pub mod utils;
pub mod structs;
pub mod source;
pub mod framer;
pub mod obis_parser;
pub mod meter_definitions;

use source::{LineSource, ReaderSource};
use structs::Telegram;

#[derive(Error, Debug)]
pub enum P1Error {
    #[error("Invalid telegram frame: {0}")]
    Frame(String),
    #[error("Checksum verification failed: telegram says {transmitted:?}, calculated {computed:04X}")]
    BadChecksum { transmitted: String, computed: u16 },
    #[error("Malformed argument in line {line:?}")]
    MalformedArgument { line: String },
    #[error("Malformed value for {field} ({obis}): {source}")]
    MalformedValue { field: String, obis: String, source: ValueError },
    #[error("Meter connection failed: {0}")]
    Io(#[from] std::io::Error),
}

impl P1Error {
    /// Only a checksum mismatch is line noise worth waiting out
    pub fn is_retryable(&self) -> bool {
        matches!(self, P1Error::BadChecksum { .. })
    }
}

/// Rejection of a raw argument by one of the converters
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{reason}: {value:?}")]
pub struct ValueError {
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Protocol {
    /// DSMR 2.2/3.0, no checksum, units ignored
    Dsmr3,
    /// DSMR 4.x, CRC16 after the end marker, units scaled
    Dsmr4,
}

impl Protocol {
    pub fn is_checksummed(&self) -> bool {
        matches!(self, Protocol::Dsmr4)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeterState {
    Idle,
    Synchronizing,
}

pub struct Meter<S: LineSource> {
    source: S,
    protocol: Protocol,
    state: MeterState,
    discarded: u64,
}

impl Meter<ReaderSource<BufReader<File>>> {
    /// Opens an already configured serial device node (or a capture file)
    pub fn open<P: AsRef<Path>>(path: P, protocol: Protocol) -> Result<Self, P1Error> {
        let file = File::open(path.as_ref())?;
        info!("Reading {:?} telegrams from {}", protocol, path.as_ref().display());
        Ok(Self::new(ReaderSource::new(BufReader::new(file)), protocol))
    }
}

impl<S: LineSource> Meter<S> {
    pub fn new(source: S, protocol: Protocol) -> Self {
        Self {
            source,
            protocol,
            state: MeterState::Idle,
            discarded: 0,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    pub fn state(&self) -> MeterState {
        self.state
    }

    /// Telegrams thrown away because of a checksum mismatch
    pub fn discarded(&self) -> u64 {
        self.discarded
    }

    pub fn into_inner(self) -> S {
        self.source
    }

    /// Blocks until the next valid telegram is decoded. Checksum failures are
    /// skipped, every other error ends the read.
    pub fn read_telegram(&mut self) -> Result<Telegram, P1Error> {
        loop {
            self.state = MeterState::Synchronizing;
            let result = framer::read_raw_telegram(&mut self.source, self.protocol)
                .and_then(|raw| obis_parser::decode_telegram(&raw, self.protocol));
            self.state = MeterState::Idle;

            match result {
                Err(e) if e.is_retryable() => {
                    self.discarded += 1;
                    warn!("Discarding telegram: {}", e);
                }
                Ok(telegram) => {
                    debug!("Decoded telegram {} with {} fields", telegram.header_id, telegram.len());
                    return Ok(telegram);
                }
                Err(e) => return Err(e),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;
    use super::structs::Value;

    fn meter(text: &str, protocol: Protocol) -> Meter<ReaderSource<Cursor<Vec<u8>>>> {
        Meter::new(ReaderSource::new(Cursor::new(text.as_bytes().to_vec())), protocol)
    }

    fn with_checksum(body: &str) -> String {
        format!("{}!{:04X}\r\n", body, utils::calculate_crc16(format!("{}!", body).as_bytes()))
    }

    const DSMR3_TELEGRAM: &str = "/ISk5\\2ME382-1003\r
\r
0-0:96.1.1(4B413650303035303738303431313130)\r
1-0:1.8.1(00185.000*kWh)\r
1-0:1.8.2(00084.000*kWh)\r
1-0:2.8.1(00013.000*kWh)\r
1-0:2.8.2(00019.000*kWh)\r
0-0:96.14.0(0001)\r
1-0:1.7.0(0000.98*kW)\r
1-0:2.7.0(0000.00*kW)\r
0-0:17.0.0(999*A)\r
0-0:96.3.10(1)\r
0-0:96.13.1()\r
0-0:96.13.0()\r
0-1:24.1.0(3)\r
0-1:96.1.0(3238313031453631373038393930)\r
0-1:24.3.0(120517020000)(08)(60)(1)(0-1:24.2.1)(m3)\r
(00124.477)\r
0-1:24.4.0(1)\r
!\r
";

    const DSMR4_BODY: &str = "/KFM5KAIFA-METER\r
\r
1-3:0.2.8(42)\r
0-0:1.0.0(101209113020W)\r
0-0:96.1.1(4B384547303034303436333935353037)\r
1-0:1.8.1(001234.567*kWh)\r
1-0:1.8.2(000576.789*kWh)\r
1-0:2.8.1(000000.000*kWh)\r
1-0:2.8.2(000000.000*kWh)\r
0-0:96.14.0(0002)\r
1-0:1.7.0(00.540*kW)\r
1-0:2.7.0(00.000*kW)\r
0-0:96.7.21(00004)\r
0-0:96.7.9(00002)\r
1-0:99.97.0(2)(0-0:96.7.19)(101208152415W)(0000000240*s)(101208151004W)(0000000301*s)\r
1-0:32.32.0(00002)\r
1-0:32.36.0(00000)\r
0-0:96.13.1()\r
0-0:96.13.0()\r
1-0:31.7.0(002*A)\r
1-0:21.7.0(00.540*kW)\r
1-0:22.7.0(00.000*kW)\r
0-1:24.1.0(003)\r
0-1:96.1.0(3232323241424344313233343536373839)\r
0-1:24.2.1(101209110000W)(12785.123*m3)\r
";

    #[test]
    fn test_read_dsmr3_telegram() {
        let mut m = meter(DSMR3_TELEGRAM, Protocol::Dsmr3);
        let telegram = m.read_telegram().unwrap();

        assert_eq!(telegram.header_marker, "/ISk5\\");
        assert_eq!(telegram.header_id, "2ME382-1003");
        assert_eq!(telegram.quantity("kWh"), Some(185.0));
        assert_eq!(telegram.quantity("W"), Some(0.98));
        assert_eq!(telegram.quantity("treshold"), Some(999.0));
        assert_eq!(telegram.get("tariff").and_then(Value::as_tariff).unwrap().as_str(), "high");
        assert_eq!(telegram.get("msg-txt").and_then(Value::as_text), Some(""));

        let gas = telegram.get("gas").and_then(Value::as_reading).unwrap();
        assert_eq!(gas.timestamp.as_tuple(), (2012, 5, 17, 2, 0));
        assert_eq!(gas.value, 124.477);
        assert_eq!(m.state(), MeterState::Idle);
    }

    #[test]
    fn test_read_dsmr4_telegram() {
        let text = with_checksum(DSMR4_BODY);
        let mut m = meter(&text, Protocol::Dsmr4);
        let telegram = m.read_telegram().unwrap();

        assert_eq!(telegram.get("version").and_then(Value::as_text), Some("42"));
        assert_eq!(telegram.get("timestamp").and_then(Value::as_timestamp).unwrap().as_tuple(), (2010, 12, 9, 11, 30));
        assert_eq!(telegram.quantity("kWh"), Some(1234.567));
        assert_eq!(telegram.quantity("A-l1"), Some(2.0));
        assert_eq!(telegram.get("long-power-failures").and_then(Value::as_count), Some(2));

        let log = telegram.get("power-failure-log").and_then(Value::as_log).unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].value, 240.0);

        let gas = telegram.get("gas").and_then(Value::as_reading).unwrap();
        assert_eq!(gas.timestamp.as_tuple(), (2010, 12, 9, 11, 0));
        assert_eq!(gas.value, 12785.123);
        assert_eq!(m.discarded(), 0);
    }

    #[test]
    fn test_transmitted_checksum() {
        let text = format!("{}!4107\r\n", DSMR4_BODY);
        assert_eq!(text, with_checksum(DSMR4_BODY));
        assert!(meter(&text, Protocol::Dsmr4).read_telegram().is_ok());
    }

    #[test]
    fn test_bad_checksum_is_skipped() {
        let crc = utils::calculate_crc16(format!("{}!", DSMR4_BODY).as_bytes());
        let corrupted = format!("{}!{:04X}\r\n", DSMR4_BODY.replace("001234.567", "001234.000"), crc);
        let good = with_checksum(&DSMR4_BODY.replace("001234.567", "001235.000"));

        let mut m = meter(&format!("{}{}", corrupted, good), Protocol::Dsmr4);
        let telegram = m.read_telegram().unwrap();
        assert_eq!(telegram.quantity("kWh"), Some(1235.0));
        assert_eq!(m.discarded(), 1);
    }

    #[test]
    fn test_only_corrupted_telegrams_ends_in_io_error() {
        let text = format!("{}!0000\r\n", DSMR4_BODY);
        let mut m = meter(&text, Protocol::Dsmr4);
        let err = m.read_telegram().unwrap_err();
        assert!(matches!(err, P1Error::Io(_)));
        assert_eq!(m.discarded(), 1);
    }

    #[test]
    fn test_continuation_decodes_like_single_line() {
        let split = "/ISk5\\2ME382-1003\r\n\r\n0-1:24.3.0(120517020000)(08)(60)(1)(0-1:24.2.1)(m3)\r\n(00124.477)\r\n!\r\n";
        let joined = "/ISk5\\2ME382-1003\r\n\r\n0-1:24.3.0(120517020000)(08)(60)(1)(0-1:24.2.1)(m3)(00124.477)\r\n!\r\n";
        let a = meter(split, Protocol::Dsmr3).read_telegram().unwrap();
        let b = meter(joined, Protocol::Dsmr3).read_telegram().unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_malformed_argument_propagates() {
        let text = "/ISk5\\2ME382-1003\r\n\r\n1-0:1.8.1(00185.000*kWh\r\n!\r\n/ISk5\\2ME382-1003\r\n\r\n!\r\n";
        let mut m = meter(text, Protocol::Dsmr3);
        assert!(matches!(m.read_telegram(), Err(P1Error::MalformedArgument { .. })));

        /* The caller decides to try again and gets the next telegram */
        assert!(m.read_telegram().unwrap().is_empty());
    }

    #[test]
    fn test_frame_error_propagates() {
        let text = "/ISk5\\2ME382-1003\r\nnot blank\r\n!\r\n";
        let mut m = meter(text, Protocol::Dsmr3);
        let err = m.read_telegram().unwrap_err();
        assert!(matches!(err, P1Error::Frame(_)));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_protocol_from_config_string() {
        let protocol: Protocol = serde_yml::from_str("dsmr4").unwrap();
        assert_eq!(protocol, Protocol::Dsmr4);
        assert!(protocol.is_checksummed());
        assert!(!Protocol::Dsmr3.is_checksummed());
    }
}
