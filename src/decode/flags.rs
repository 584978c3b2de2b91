//! Packed boolean decoding from fixed metadata blocks. Only the older
//! format variant stores these here; the newer one redirects them to the
//! variable-data store and never reaches this module.

use crate::model::Assignment;

/// Single bit out of a raw buffer; a byte past the end reads as unset,
/// short metadata being a skippable anomaly rather than an error.
pub fn bit_flag(data: &[u8], offset: usize, mask: u8) -> bool {
    data.get(offset).map_or(false, |byte| byte & mask != 0)
}

// Metadata byte positions of the packed flag block.
const FLAG1_OFFSET: usize = 28;
const FLAGS_2_9_OFFSET: usize = 29;
const FLAGS_10_17_OFFSET: usize = 30;
const FLAGS_18_20_OFFSET: usize = 31;

pub const CONFIRMED_OFFSET: usize = 8;
pub const CONFIRMED_MASK: u8 = 0x80;
pub const RESPONSE_PENDING_OFFSET: usize = 9;
pub const RESPONSE_PENDING_MASK: u8 = 0x01;
pub const TEAM_STATUS_PENDING_OFFSET: usize = 10;
pub const TEAM_STATUS_PENDING_MASK: u8 = 0x02;

/// Populate the twenty numbered flags from their packed layout: flag 1 is
/// bit 7 of byte 28, flags 2-9 fill byte 29, flags 10-17 fill byte 30 and
/// flags 18-20 sit in bits 0-2 of byte 31.
pub fn populate_flags(assignment: &mut Assignment, meta: &[u8]) {
    assignment.set_flag(1, bit_flag(meta, FLAG1_OFFSET, 0x80));

    for bit in 0..8u8 {
        assignment.set_flag(2 + bit, bit_flag(meta, FLAGS_2_9_OFFSET, 1 << bit));
    }
    for bit in 0..8u8 {
        assignment.set_flag(10 + bit, bit_flag(meta, FLAGS_10_17_OFFSET, 1 << bit));
    }
    for bit in 0..3u8 {
        assignment.set_flag(18 + bit, bit_flag(meta, FLAGS_18_20_OFFSET, 1 << bit));
    }
}
