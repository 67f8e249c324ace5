//! DCA container format
//!
//! A container is a flat run of records with no header and no terminator:
//!
//! ```text
//! +-------------------+---------------------+-------------------+-----
//! | len: u16 LE       | payload: len bytes  | len: u16 LE       | ...
//! +-------------------+---------------------+-------------------+-----
//! ```
//!
//! The stream ends when a length read meets end-of-input with zero bytes
//! consumed. A partial length header, or a payload shorter than its declared
//! length, makes the container malformed. Lengths are limited to the positive
//! range of a signed 16-bit integer.

/// Size of the length prefix in bytes.
pub const LENGTH_PREFIX_SIZE: usize = 2;

/// Largest payload a single record may carry.
pub const MAX_FRAME_LEN: usize = i16::MAX as usize;

/// Decode a record length prefix.
pub fn parse_length(prefix: [u8; LENGTH_PREFIX_SIZE]) -> usize {
    u16::from_le_bytes(prefix) as usize
}

/// Append one record (length prefix + payload) to `out`.
///
/// Callers must ensure `payload.len() <= MAX_FRAME_LEN`; [`Frame`](crate::Frame)
/// enforces this on construction.
pub fn write_record(out: &mut Vec<u8>, payload: &[u8]) {
    debug_assert!(payload.len() <= MAX_FRAME_LEN);
    out.extend_from_slice(&(payload.len() as u16).to_le_bytes());
    out.extend_from_slice(payload);
}

/// Encode raw payloads as a container.
///
/// Returns `None` if any payload exceeds [`MAX_FRAME_LEN`].
pub fn encode_container<P: AsRef<[u8]>>(payloads: &[P]) -> Option<Vec<u8>> {
    let mut out = Vec::new();
    for payload in payloads {
        let payload = payload.as_ref();
        if payload.len() > MAX_FRAME_LEN {
            return None;
        }
        write_record(&mut out, payload);
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefix_is_little_endian() {
        assert_eq!(parse_length([0x02, 0x00]), 2);
        assert_eq!(parse_length([0x00, 0x01]), 256);
        assert_eq!(parse_length([0xFF, 0x7F]), MAX_FRAME_LEN);
    }

    #[test]
    fn encode_matches_documented_layout() {
        let bytes = encode_container(&[&[0xAB, 0xCD][..], &[0x01, 0x02, 0x03][..]]).unwrap();
        assert_eq!(bytes, vec![0x02, 0x00, 0xAB, 0xCD, 0x03, 0x00, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn encode_rejects_oversized_payload() {
        let big = vec![0u8; MAX_FRAME_LEN + 1];
        assert!(encode_container(&[big]).is_none());
    }

    #[test]
    fn empty_payload_is_a_bare_prefix() {
        let bytes = encode_container(&[Vec::<u8>::new()]).unwrap();
        assert_eq!(bytes, vec![0x00, 0x00]);
    }
}
