//! Post-decode cleanup of timephased sequences. Raw blobs often split a
//! uniform stretch of work across several same-rate blocks; callers that
//! did not ask for raw data get those merged back together.

use crate::calendar::ProjectCalendar;
use crate::model::WorkSegment;
use crate::types::{Duration, ProjectProperties};

pub trait TimephasedNormaliser {
    fn normalise(
        &self,
        calendar: &dyn ProjectCalendar,
        props: &ProjectProperties,
        list: &mut Vec<WorkSegment>,
    );
}

/// Merges adjacent segments that share a rate and sit on contiguous
/// working time, summing their totals. Modified segments never merge.
pub struct StandardNormaliser;

impl TimephasedNormaliser for StandardNormaliser {
    fn normalise(
        &self,
        calendar: &dyn ProjectCalendar,
        props: &ProjectProperties,
        list: &mut Vec<WorkSegment>,
    ) {
        if list.len() < 2 {
            return;
        }

        let mut merged: Vec<WorkSegment> = Vec::with_capacity(list.len());
        for segment in list.drain(..) {
            let mergeable = merged.last().map_or(false, |previous| {
                !previous.modified
                    && !segment.modified
                    && same_rate(&previous.work_per_day, &segment.work_per_day, props)
                    && contiguous(previous, &segment, calendar)
            });
            if mergeable {
                if let Some(previous) = merged.last_mut() {
                    previous.finish = segment.finish;
                    previous.total_work = Duration::minutes(
                        previous.total_work.as_minutes(props)
                            + segment.total_work.as_minutes(props),
                    );
                }
            } else {
                merged.push(segment);
            }
        }
        *list = merged;
    }
}

fn same_rate(a: &Duration, b: &Duration, props: &ProjectProperties) -> bool {
    (a.as_minutes(props) - b.as_minutes(props)).abs() < 0.001
}

fn contiguous(previous: &WorkSegment, next: &WorkSegment, calendar: &dyn ProjectCalendar) -> bool {
    next.start == previous.finish || next.start == calendar.next_work_start(previous.finish)
}
