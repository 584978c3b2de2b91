//! Hyperlink sub-record decoding. The blob carries four null-terminated
//! UTF-16 strings (display text, address, sub-address, screen tip), each
//! preceded by a 12-byte header block, after a further 12 bytes of
//! leading header. Short blobs truncate; fields the cursor never reaches
//! stay unset.

use binary_reader::{BinaryReader, Endian};

use crate::model::Assignment;

const HEADER_SKIP: usize = 12;

pub fn process_hyperlink_data(assignment: &mut Assignment, data: Option<&[u8]>) {
    let data = match data {
        Some(d) => d,
        None => return,
    };

    let mut reader = BinaryReader::from_u8(data);
    reader.set_endian(Endian::Little);
    reader.jmp(HEADER_SKIP);

    assignment.hyperlink = read_field(&mut reader);
    assignment.hyperlink_address = read_field(&mut reader);
    assignment.hyperlink_sub_address = read_field(&mut reader);
    assignment.hyperlink_screen_tip = read_field(&mut reader);
}

fn read_field(reader: &mut BinaryReader) -> Option<String> {
    let skip_to = reader.pos + HEADER_SKIP;
    if skip_to + 2 > reader.data.len() {
        return None;
    }
    reader.jmp(skip_to);
    Some(read_unicode_string(reader))
}

/// Reads UTF-16-LE code units up to the terminator, or the end of the
/// blob when no terminator exists.
fn read_unicode_string(reader: &mut BinaryReader) -> String {
    let mut units = Vec::new();
    while reader.pos + 2 <= reader.data.len() {
        let unit = match reader.read_u16() {
            Ok(u) => u,
            Err(_) => break,
        };
        if unit == 0 {
            break;
        }
        units.push(unit);
    }
    String::from_utf16_lossy(&units)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn append_string(blob: &mut Vec<u8>, text: &str) {
        blob.extend_from_slice(&[0u8; 12]);
        for unit in text.encode_utf16() {
            blob.extend_from_slice(&unit.to_le_bytes());
        }
        blob.extend_from_slice(&[0, 0]);
    }

    #[test]
    fn test_round_trip() {
        let mut blob = vec![0u8; 12];
        append_string(&mut blob, "A");
        append_string(&mut blob, "B");
        append_string(&mut blob, "C");
        append_string(&mut blob, "D");

        let mut a = Assignment::new(1);
        process_hyperlink_data(&mut a, Some(&blob));
        assert_eq!(a.hyperlink.as_deref(), Some("A"));
        assert_eq!(a.hyperlink_address.as_deref(), Some("B"));
        assert_eq!(a.hyperlink_sub_address.as_deref(), Some("C"));
        assert_eq!(a.hyperlink_screen_tip.as_deref(), Some("D"));
    }

    #[test]
    fn test_absent_blob_leaves_fields_unset() {
        let mut a = Assignment::new(1);
        process_hyperlink_data(&mut a, None);
        assert_eq!(a.hyperlink, None);
        assert_eq!(a.hyperlink_screen_tip, None);
    }

    #[test]
    fn test_truncated_blob() {
        let mut blob = vec![0u8; 12];
        append_string(&mut blob, "link");
        // No further header blocks; the remaining fields stay unset.
        let mut a = Assignment::new(1);
        process_hyperlink_data(&mut a, Some(&blob));
        assert_eq!(a.hyperlink.as_deref(), Some("link"));
        assert_eq!(a.hyperlink_address, None);
    }
}
