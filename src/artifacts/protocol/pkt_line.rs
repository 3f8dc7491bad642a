//! pkt-line framing
//!
//! Every line is prefixed with its total length (prefix included) as four
//! lowercase hex digits. The special length `0000` is a flush packet, which
//! separates sections of a message.

use crate::errors::NibError;
use bytes::Bytes;

/// Upper bound on decoded lines; anything longer is treated as a broken peer
pub const MAX_PKT_LINES: usize = 1000;

const LENGTH_PREFIX_SIZE: usize = 4;
const FLUSH_PKT: &[u8; 4] = b"0000";

/// Frame each line, append a newline to it, and terminate with a flush
pub fn encode_lines<L: AsRef<[u8]>>(lines: &[L]) -> Bytes {
    let mut encoded = Vec::new();

    for line in lines {
        let line = line.as_ref();
        encoded.extend_from_slice(format!("{:04x}", line.len() + LENGTH_PREFIX_SIZE + 1).as_bytes());
        encoded.extend_from_slice(line);
        encoded.push(b'\n');
    }
    encoded.extend_from_slice(FLUSH_PKT);

    Bytes::from(encoded)
}

/// Split a pkt-line stream into raw payloads
///
/// Payloads keep their trailing newline; a flush decodes to an empty line.
pub fn decode_lines(data: &Bytes) -> anyhow::Result<Vec<Bytes>> {
    let mut lines = Vec::new();
    let mut offset = 0;

    while offset < data.len() {
        if lines.len() >= MAX_PKT_LINES {
            return Err(NibError::Protocol(format!(
                "more than {MAX_PKT_LINES} pkt-lines in response"
            ))
            .into());
        }

        let prefix = data
            .get(offset..offset + LENGTH_PREFIX_SIZE)
            .ok_or_else(|| NibError::Protocol("truncated pkt-line length".to_string()))?;
        let length = parse_length(prefix)?;

        if length == 0 {
            lines.push(Bytes::new());
            offset += LENGTH_PREFIX_SIZE;
            continue;
        }

        if length < LENGTH_PREFIX_SIZE {
            return Err(NibError::Protocol(format!("invalid pkt-line length {length}")).into());
        }

        let end = offset + length;
        if end > data.len() {
            return Err(NibError::Protocol(format!(
                "pkt-line declares {length} bytes but only {} remain",
                data.len() - offset
            ))
            .into());
        }

        lines.push(data.slice(offset + LENGTH_PREFIX_SIZE..end));
        offset = end;
    }

    Ok(lines)
}

/// Payload without the framing newline, as text
pub fn line_text(line: &[u8]) -> String {
    let line = line.strip_suffix(b"\n").unwrap_or(line);
    String::from_utf8_lossy(line).into_owned()
}

fn parse_length(prefix: &[u8]) -> anyhow::Result<usize> {
    if !prefix.iter().all(u8::is_ascii_hexdigit) {
        return Err(NibError::Protocol(format!(
            "invalid pkt-line length prefix {:?}",
            String::from_utf8_lossy(prefix)
        ))
        .into());
    }

    let prefix = std::str::from_utf8(prefix)
        .map_err(|_| NibError::Protocol("invalid pkt-line length prefix".to_string()))?;
    let length = usize::from_str_radix(prefix, 16)
        .map_err(|e| NibError::Protocol(format!("invalid pkt-line length: {e}")))?;

    Ok(length)
}
