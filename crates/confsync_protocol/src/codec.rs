//! Encoding and decoding of configuration frames.

use crate::error::{CodecError, CodecResult};
use confsync_store::ConfigEntry;

/// Maximum number of header characters before the terminator.
pub const MAX_HEADER_LEN: usize = 20;

/// Maximum body length in bytes (1 MiB).
pub const MAX_BODY_LEN: usize = 1024 * 1024;

/// Encodes entries into a frame body: one `[SECTION]KEY=VALUE\n` line per
/// entry, sorted by section then key.
pub fn encode_body(entries: &[ConfigEntry]) -> String {
    let mut sorted: Vec<&ConfigEntry> = entries.iter().collect();
    sorted.sort();

    let mut body = String::new();
    for entry in sorted {
        body.push('[');
        body.push_str(&entry.section);
        body.push(']');
        body.push_str(&entry.key);
        body.push('=');
        body.push_str(&entry.value);
        body.push('\n');
    }
    body
}

/// Encodes entries into a complete frame: decimal body length, newline, body.
pub fn encode_frame(entries: &[ConfigEntry]) -> Vec<u8> {
    let body = encode_body(entries);
    let mut frame = format!("{}\n", body.len()).into_bytes();
    frame.extend_from_slice(body.as_bytes());
    frame
}

/// Parses a frame header line as an unsigned decimal body length.
///
/// Checks the length limit before parsing so an oversized declaration is
/// rejected without the caller reading any body bytes.
pub fn parse_header(header: &str) -> CodecResult<u64> {
    if header.len() > MAX_HEADER_LEN {
        return Err(CodecError::HeaderTooLong {
            len: header.len(),
            max: MAX_HEADER_LEN,
        });
    }

    let len: u64 = header
        .trim()
        .parse()
        .map_err(|_| CodecError::InvalidHeader(header.to_string()))?;

    if len as usize > MAX_BODY_LEN {
        return Err(CodecError::BodyTooLarge {
            len,
            max: MAX_BODY_LEN,
        });
    }

    Ok(len)
}

/// Decodes a frame body into configuration entries.
///
/// Lines that do not start with `[`, or that are missing the `]` or `=`
/// separators, are skipped: a single corrupted line never invalidates an
/// otherwise-valid frame. Trailing whitespace is trimmed from values.
pub fn decode_body(body: &[u8]) -> Vec<ConfigEntry> {
    let text = String::from_utf8_lossy(body);
    let mut entries = Vec::new();

    for line in text.lines() {
        if !line.starts_with('[') {
            continue;
        }

        let Some(section_end) = line.find(']') else {
            continue;
        };
        let Some(equals_pos) = line[section_end..].find('=').map(|i| i + section_end) else {
            continue;
        };

        let section = &line[1..section_end];
        let key = &line[section_end + 1..equals_pos];
        let value = line[equals_pos + 1..].trim_end();

        entries.push(ConfigEntry::new(section, key, value));
    }

    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn single_entry_frame() {
        let entries = vec![ConfigEntry::new("NETWORK", "PORT", "9000")];
        let frame = encode_frame(&entries);

        // Body is exactly "[NETWORK]PORT=9000\n": 19 bytes.
        assert_eq!(frame, b"19\n[NETWORK]PORT=9000\n");

        let decoded = decode_body(b"[NETWORK]PORT=9000\n");
        assert_eq!(decoded, entries);
    }

    #[test]
    fn empty_snapshot_encodes_zero_length_frame() {
        assert_eq!(encode_frame(&[]), b"0\n");
    }

    #[test]
    fn body_lines_are_sorted_section_then_key() {
        let entries = vec![
            ConfigEntry::new("PWM", "PWM_MIN", "1100"),
            ConfigEntry::new("LED", "CHANNEL", "5"),
            ConfigEntry::new("LED", "ON_VALUE", "1"),
        ];
        let body = encode_body(&entries);
        assert_eq!(body, "[LED]CHANNEL=5\n[LED]ON_VALUE=1\n[PWM]PWM_MIN=1100\n");
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let body = b"garbage\n[NO_CLOSE KEY=1\n[OK]GOOD=yes\n[NO_EQUALS]KEY\n";
        let decoded = decode_body(body);
        assert_eq!(decoded, vec![ConfigEntry::new("OK", "GOOD", "yes")]);
    }

    #[test]
    fn values_are_trimmed_of_trailing_whitespace() {
        let decoded = decode_body(b"[A]K=value \t\r\n");
        assert_eq!(decoded, vec![ConfigEntry::new("A", "K", "value")]);
    }

    #[test]
    fn value_may_contain_equals() {
        let decoded = decode_body(b"[A]EXPR=a=b\n");
        assert_eq!(decoded, vec![ConfigEntry::new("A", "EXPR", "a=b")]);
    }

    #[test]
    fn header_parses_decimal() {
        assert_eq!(parse_header("0").unwrap(), 0);
        assert_eq!(parse_header("1234").unwrap(), 1234);
        assert_eq!(parse_header(" 42 ").unwrap(), 42);
    }

    #[test]
    fn header_rejects_non_numeric() {
        assert!(matches!(
            parse_header("12ab"),
            Err(CodecError::InvalidHeader(_))
        ));
        assert!(matches!(parse_header(""), Err(CodecError::InvalidHeader(_))));
        assert!(matches!(
            parse_header("-5"),
            Err(CodecError::InvalidHeader(_))
        ));
    }

    #[test]
    fn header_rejects_too_long() {
        let header = "1".repeat(MAX_HEADER_LEN + 1);
        assert!(matches!(
            parse_header(&header),
            Err(CodecError::HeaderTooLong { .. })
        ));
    }

    #[test]
    fn header_rejects_oversized_body() {
        assert_eq!(parse_header("1048576").unwrap(), 1_048_576);
        assert!(matches!(
            parse_header("1048577"),
            Err(CodecError::BodyTooLarge { len: 1_048_577, .. })
        ));
    }

    fn entry_strategy() -> impl Strategy<Value = ConfigEntry> {
        // Sections and keys must avoid the structural characters; values may
        // not contain newlines or trailing whitespace (trimmed on decode).
        (
            "[A-Z_]{1,12}",
            "[A-Z_]{1,12}",
            "[a-zA-Z0-9._:-]{0,20}",
        )
            .prop_map(|(section, key, value)| ConfigEntry::new(section, key, value))
    }

    proptest! {
        #[test]
        fn roundtrip_preserves_entry_set(
            entries in proptest::collection::btree_set(entry_strategy(), 0..20)
        ) {
            // Deduplicate by (section, key): later values win in the store,
            // so the codec only guarantees round-tripping unique keys.
            let mut unique: Vec<ConfigEntry> = Vec::new();
            for entry in entries {
                if !unique
                    .iter()
                    .any(|e| e.section == entry.section && e.key == entry.key)
                {
                    unique.push(entry);
                }
            }

            let frame = encode_frame(&unique);
            let newline = frame.iter().position(|&b| b == b'\n').unwrap();
            let header = std::str::from_utf8(&frame[..newline]).unwrap();
            let body = &frame[newline + 1..];

            prop_assert_eq!(parse_header(header).unwrap() as usize, body.len());

            let mut decoded = decode_body(body);
            decoded.sort();
            unique.sort();
            prop_assert_eq!(decoded, unique);
        }
    }
}
