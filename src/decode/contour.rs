//! Work-contour classification. A hand-shaped curve always classifies as
//! contoured; otherwise the planned-work blob carries a named shape code.

use crate::tables::bytes;
use crate::types::WorkContour;

const SHAPE_CODE_OFFSET: usize = 28;
const MIN_SHAPED_BLOB: usize = 30;

/// `modified` is the factory's verdict over the decoded planned segments.
/// Callers only invoke this when a planned-work blob was present.
pub fn classify(planned_data: &[u8], modified: bool) -> WorkContour {
    if modified {
        return WorkContour::Contoured;
    }
    if planned_data.len() >= MIN_SHAPED_BLOB {
        WorkContour::from_code(bytes::get_short(planned_data, SHAPE_CODE_OFFSET))
    } else {
        WorkContour::Flat
    }
}
