use super::{source::LineSource, structs::RawTelegram, utils, P1Error, Protocol};
use log::debug;

const HEADER_MARKER_LEN: usize = 6;

/// Strips line terminator, surrounding whitespace and stray NUL bytes
pub fn clean_line(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw)
        .trim_matches(|c: char| c.is_whitespace() || c == '\0')
        .to_string()
}

/// Splits `/XMX5LGBBFG1009327583` into header marker and header identifier
pub fn split_header(line: &str) -> Result<(String, String), P1Error> {
    if line.chars().count() < HEADER_MARKER_LEN {
        return Err(P1Error::Frame(format!("header line too short: {:?}", line)));
    }

    let split_at = line.char_indices()
        .nth(HEADER_MARKER_LEN)
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    let (marker, id) = line.split_at(split_at);
    Ok((marker.to_string(), id.trim().to_string()))
}

/// Glues lines starting with `(` onto the object line before them
pub fn merge_continuations(raw_lines: Vec<String>) -> Vec<String> {
    let mut lines: Vec<String> = Vec::with_capacity(raw_lines.len());
    for raw_line in raw_lines {
        if raw_line.starts_with('(') {
            if let Some(last) = lines.last_mut() {
                last.push_str(&raw_line);
                continue;
            }
        }
        lines.push(raw_line);
    }
    lines
}

/// Reads one telegram off the source: waits for the start marker, collects the
/// data lines up to the end marker and checks the CRC where the protocol has one.
pub fn read_raw_telegram<S: LineSource + ?Sized>(source: &mut S, protocol: Protocol) -> Result<RawTelegram, P1Error> {
    /* Everything from the '/' up to and including the '!' is covered by the CRC */
    let mut crc_data: Vec<u8> = Vec::new();

    let header = loop {
        let raw = source.read_line()?;
        let line = clean_line(&raw);
        if !line.starts_with('/') {
            debug!("skipping line {:?}", line);
            continue;
        }
        if let Some(start) = raw.iter().position(|b| *b == b'/') {
            crc_data.extend_from_slice(&raw[start..]);
        }
        break line;
    };

    let (header_marker, header_id) = split_header(&header)?;

    let raw = source.read_line()?;
    let separator = clean_line(&raw);
    if !separator.is_empty() {
        return Err(P1Error::Frame(format!("expected blank separator, got {:?}", separator)));
    }
    crc_data.extend_from_slice(&raw);

    let mut raw_lines = Vec::new();
    let end_line = loop {
        let raw = source.read_line()?;
        let line = clean_line(&raw);
        if line.starts_with('!') {
            break line;
        }
        if line.starts_with('/') {
            return Err(P1Error::Frame(format!("start of next telegram {:?} before end marker", line)));
        }
        crc_data.extend_from_slice(&raw);
        raw_lines.push(line);
    };

    if protocol.is_checksummed() {
        crc_data.push(b'!');
        let transmitted = end_line[1..].trim();
        if let Err(computed) = utils::verify_checksum(&crc_data, transmitted) {
            return Err(P1Error::BadChecksum {
                transmitted: transmitted.to_string(),
                computed,
            });
        }
    }

    debug!("framed telegram {} with {} lines", header_id, raw_lines.len());

    Ok(RawTelegram {
        header_marker,
        header_id,
        lines: merge_continuations(raw_lines),
    })
}
