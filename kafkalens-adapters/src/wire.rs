//! Schema registry wire format helpers.
//!
//! Registry-encoded payloads start with a zero magic byte followed by the
//! big-endian 4-byte schema id.

const MAGIC_BYTE: u8 = 0;
const HEADER_LEN: usize = 5;

/// Split a payload into its schema id (if registry-framed) and body.
pub fn split_schema_id(payload: &[u8]) -> (Option<i32>, &[u8]) {
    if payload.len() >= HEADER_LEN && payload[0] == MAGIC_BYTE {
        let id = i32::from_be_bytes([payload[1], payload[2], payload[3], payload[4]]);
        (Some(id), &payload[HEADER_LEN..])
    } else {
        (None, payload)
    }
}

/// Decode an optional payload for display.
pub fn decode_payload(payload: Option<&[u8]>) -> (Option<i32>, String) {
    match payload {
        Some(bytes) => {
            let (id, body) = split_schema_id(bytes);
            (id, String::from_utf8_lossy(body).into_owned())
        }
        None => (None, String::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registry_framed_payload_reports_id() {
        let payload = [0u8, 0, 0, 1, 44, b'h', b'i'];
        let (id, body) = split_schema_id(&payload);
        assert_eq!(id, Some(300));
        assert_eq!(body, b"hi");
    }

    #[test]
    fn plain_payload_has_no_id() {
        let (id, body) = split_schema_id(b"{\"a\":1}");
        assert_eq!(id, None);
        assert_eq!(body, b"{\"a\":1}");
    }

    #[test]
    fn short_zero_prefixed_payload_is_plain() {
        let (id, body) = split_schema_id(&[0u8, 1]);
        assert_eq!(id, None);
        assert_eq!(body, &[0u8, 1]);
    }

    #[test]
    fn missing_payload_decodes_empty() {
        assert_eq!(decode_payload(None), (None, String::new()));
    }
}
