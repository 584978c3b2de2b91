//! Decodes the two compact timephased-work encodings into ordered work
//! segments, mapping raw working-time offsets to real dates through the
//! calendar.
//!
//! Complete-work blob: u16 block count at 0, cumulative finish offset
//! (i32, 1/80 minute units) at 24, then 20-byte blocks from offset 32:
//! start offset (i32 /80 -> working minutes), cumulative work (f64,
//! 1/1000 minute units), rate (i32, /125*6 -> minutes per day) and 4
//! unused bytes. Each block's finish is delimited by the next block's start
//! offset; the last block closes against the header field.
//!
//! Planned-work blob: u16 block count at 0, finish offset (i32 /80) at
//! 24, header rate (i32 /10) at 28, then 28-byte blocks from offset 40:
//! start offset (i32 /80), cumulative work (f64 /1000), 8 unused bytes,
//! rate (u16 *6), modified flag (u16, bit 0) and 4 trailing unused
//! bytes. When completed segments
//! exist, all planned offsets are measured from the end of completed
//! work so remaining work is not double counted.

use binary_reader::{BinaryReader, Endian};
use log::debug;

use crate::calendar::ProjectCalendar;
use crate::model::WorkSegment;
use crate::tables::bytes;
use crate::types::{Date, Duration, ProjectProperties};

const COMPLETE_HEADER_SIZE: usize = 32;
const COMPLETE_BLOCK_SIZE: usize = 20;
const PLANNED_HEADER_SIZE: usize = 40;
const PLANNED_BLOCK_SIZE: usize = 28;
const FINISH_OFFSET_INDEX: usize = 24;
const HEADER_RATE_INDEX: usize = 28;

pub struct TimephasedWorkFactory;

impl TimephasedWorkFactory {
    pub fn new() -> TimephasedWorkFactory {
        TimephasedWorkFactory
    }

    /// Decode the completed-work blob into segments anchored at the
    /// assignment start.
    pub fn complete_work(
        &self,
        calendar: &dyn ProjectCalendar,
        props: &ProjectProperties,
        start: Option<Date>,
        data: Option<&[u8]>,
    ) -> Vec<WorkSegment> {
        let mut list = Vec::new();
        let data = match data {
            Some(d) if d.len() >= COMPLETE_HEADER_SIZE => d,
            Some(d) => {
                debug!("complete work blob too short ({} bytes), ignored", d.len());
                return list;
            }
            None => return list,
        };
        let start = match start {
            Some(s) => s,
            None => {
                debug!("assignment has no start date, complete work ignored");
                return list;
            }
        };

        let block_count = bytes::get_short(data, 0) as usize;
        let mut reader = BinaryReader::from_u8(data);
        reader.set_endian(Endian::Little);
        reader.jmp(COMPLETE_HEADER_SIZE);

        let mut previous_cumulative = 0.0;
        let mut block = 0;
        while block < block_count && reader.pos + COMPLETE_BLOCK_SIZE <= data.len() {
            let block_offset = match reader.read_i32() {
                Ok(v) => v as f64 / 80.0,
                Err(_) => break,
            };
            let cumulative = match reader.read_f64() {
                Ok(v) => v.trunc(),
                Err(_) => break,
            };
            let total = (cumulative - previous_cumulative) / 1000.0;
            previous_cumulative = cumulative;
            let rate = match reader.read_i32() {
                Ok(v) => v as f64 / 125.0 * 6.0,
                Err(_) => break,
            };
            // 4 trailing bytes of the block are unused.
            if reader.read_i32().is_err() {
                break;
            }

            let offset = Duration::minutes(block_offset);
            let segment_start = if block_offset == 0.0 {
                start
            } else {
                calendar.date_from_work(start, offset, true, props)
            };

            close_previous(&mut list, calendar.date_from_work(start, offset, false, props));

            list.push(WorkSegment {
                start: segment_start,
                finish: segment_start,
                work_per_day: Duration::minutes(rate),
                total_work: Duration::minutes(total),
                modified: false,
            });

            block += 1;
        }

        let finish_offset =
            Duration::minutes(bytes::get_int(data, FINISH_OFFSET_INDEX) as f64 / 80.0);
        close_last(&mut list, calendar.date_from_work(start, finish_offset, false, props));
        list
    }

    /// Decode the planned-work blob. `complete` is the already decoded
    /// completed sequence; when present it anchors the planned offsets.
    pub fn planned_work(
        &self,
        calendar: &dyn ProjectCalendar,
        props: &ProjectProperties,
        start: Option<Date>,
        units: f64,
        data: Option<&[u8]>,
        complete: &[WorkSegment],
    ) -> Vec<WorkSegment> {
        let mut list = Vec::new();
        let data = match data {
            Some(d) if d.len() >= 2 => d,
            _ => return list,
        };
        let start = match start {
            Some(s) => s,
            None => {
                debug!("assignment has no start date, planned work ignored");
                return list;
            }
        };

        let block_count = bytes::get_short(data, 0) as usize;
        if block_count == 0 {
            // No shaped blocks: the header alone describes the remaining
            // work, but only once some work has completed.
            if let Some(last_complete) = complete.last() {
                if units != 0.0 && data.len() >= PLANNED_HEADER_SIZE - 8 {
                    let remaining_start = calendar.next_work_start(last_complete.finish);
                    let total = bytes::get_int(data, FINISH_OFFSET_INDEX) as f64 / 80.0;
                    // The span covers the rate-adjusted duration; the
                    // recorded total is the work itself.
                    let adjusted = Duration::minutes(total * 100.0 / units);
                    let finish = calendar.date_from_work(remaining_start, adjusted, false, props);
                    let rate = bytes::get_int(data, HEADER_RATE_INDEX) as f64 / 10.0;
                    if remaining_start != finish {
                        list.push(WorkSegment {
                            start: remaining_start,
                            finish,
                            work_per_day: Duration::minutes(rate),
                            total_work: Duration::minutes(total),
                            modified: false,
                        });
                    }
                }
            }
            return list;
        }

        let anchor = match complete.last() {
            Some(last) => last.finish,
            None => start,
        };

        let mut reader = BinaryReader::from_u8(data);
        reader.set_endian(Endian::Little);
        reader.jmp(PLANNED_HEADER_SIZE);

        let mut previous_cumulative = 0.0;
        let mut block = 0;
        while block < block_count && reader.pos + PLANNED_BLOCK_SIZE <= data.len() {
            let block_offset = match reader.read_i32() {
                Ok(v) => v as f64 / 80.0,
                Err(_) => break,
            };
            let cumulative = match reader.read_f64() {
                Ok(v) => v,
                Err(_) => break,
            };
            let total = (cumulative - previous_cumulative) / 1000.0;
            previous_cumulative = cumulative;
            if reader.read_bytes(8).is_err() {
                break;
            }
            let rate = match reader.read_u16() {
                Ok(v) => v as f64 * 6.0,
                Err(_) => break,
            };
            let modified = match reader.read_u16() {
                Ok(v) => v & 0x0001 != 0,
                Err(_) => break,
            };
            // 4 trailing bytes of the block are unused.
            if reader.read_i32().is_err() {
                break;
            }

            let offset = Duration::minutes(block_offset);
            let segment_start = if block_offset == 0.0 {
                anchor
            } else {
                calendar.date_from_work(anchor, offset, true, props)
            };

            close_previous(&mut list, calendar.date_from_work(anchor, offset, false, props));

            list.push(WorkSegment {
                start: segment_start,
                finish: segment_start,
                work_per_day: Duration::minutes(rate),
                total_work: Duration::minutes(total),
                modified,
            });

            block += 1;
        }

        let finish_offset =
            Duration::minutes(bytes::get_int(data, FINISH_OFFSET_INDEX) as f64 / 80.0);
        close_last(&mut list, calendar.date_from_work(anchor, finish_offset, false, props));
        list
    }

    /// True when any decoded segment carries a hand-shaped rate.
    pub fn work_modified(&self, segments: &[WorkSegment]) -> bool {
        segments.iter().any(|segment| segment.modified)
    }
}

impl Default for TimephasedWorkFactory {
    fn default() -> TimephasedWorkFactory {
        TimephasedWorkFactory::new()
    }
}

/// The start of each block delimits the previous block's finish; blocks
/// that collapse to a zero-length span are dropped.
fn close_previous(list: &mut Vec<WorkSegment>, finish: Date) {
    if let Some(previous) = list.last_mut() {
        previous.finish = finish;
        if previous.start == previous.finish {
            list.pop();
        }
    }
}

fn close_last(list: &mut Vec<WorkSegment>, finish: Date) {
    if let Some(last) = list.last_mut() {
        last.finish = finish;
        if last.start == finish {
            list.pop();
        }
    }
}
