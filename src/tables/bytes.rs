//! Little-endian random-access reads over raw record buffers. Reads past
//! the end of a buffer yield zero; undersized records are a known quirk of
//! the format, not an error.

use chrono::NaiveDate;

use crate::types::Date;

// Day counts are measured from this date; values below 100 mean "unset".
const TIMESTAMP_EPOCH: (i32, u32, u32) = (1983, 12, 31);

pub fn get_byte(data: &[u8], offset: usize) -> u8 {
    data.get(offset).copied().unwrap_or(0)
}

pub fn get_short(data: &[u8], offset: usize) -> u16 {
    (get_byte(data, offset) as u16) | ((get_byte(data, offset + 1) as u16) << 8)
}

pub fn get_int(data: &[u8], offset: usize) -> i32 {
    (get_byte(data, offset) as i32)
        | ((get_byte(data, offset + 1) as i32) << 8)
        | ((get_byte(data, offset + 2) as i32) << 16)
        | ((get_byte(data, offset + 3) as i32) << 24)
}

pub fn get_long(data: &[u8], offset: usize) -> u64 {
    let mut result = 0u64;
    for i in 0..8 {
        result |= (get_byte(data, offset + i) as u64) << (i * 8);
    }
    result
}

pub fn get_double(data: &[u8], offset: usize) -> f64 {
    f64::from_bits(get_long(data, offset))
}

/// Four-byte timestamp: tenths of minutes since midnight in the low word,
/// days since the 1983-12-31 epoch in the high word.
pub fn get_timestamp(data: &[u8], offset: usize) -> Option<Date> {
    let time = get_short(data, offset);
    let days = get_short(data, offset + 2);
    if days < 100 {
        return None;
    }
    let (y, m, d) = TIMESTAMP_EPOCH;
    let epoch = NaiveDate::from_ymd_opt(y, m, d)?;
    let date = epoch.checked_add_days(chrono::Days::new(days as u64))?;
    let midnight = date.and_hms_opt(0, 0, 0)?;
    midnight.checked_add_signed(chrono::Duration::minutes((time / 10) as i64))
}

/// Null-terminated UTF-16-LE string. A missing terminator truncates at the
/// end of the buffer rather than failing.
pub fn get_unicode_string(data: &[u8], offset: usize) -> String {
    let mut units = Vec::new();
    let mut pos = offset;
    while pos + 2 <= data.len() {
        let unit = get_short(data, pos);
        if unit == 0 {
            break;
        }
        units.push(unit);
        pos += 2;
    }
    String::from_utf16_lossy(&units)
}
