//! Split-task detection over decoded work segments. The decoder only
//! consumes the trait; the gap-based default keeps the crate usable when
//! no richer implementation is wired in.

use itertools::Itertools;

use crate::model::{Task, WorkSegment};
use crate::types::DateRange;

pub trait SplitDetector {
    /// Populate `task.splits` from the completed and planned sequences.
    /// Invoked only for tasks whose split list exists but is still empty.
    fn process(&self, task: &mut Task, complete: &[WorkSegment], planned: &[WorkSegment]);
}

/// Treats any discontinuity between consecutive work segments as a pause:
/// the task's splits become the contiguous spans of active work. A task
/// with a single span is not split and its list stays empty.
pub struct GapSplitDetector;

impl SplitDetector for GapSplitDetector {
    fn process(&self, task: &mut Task, complete: &[WorkSegment], planned: &[WorkSegment]) {
        let ordered = complete
            .iter()
            .chain(planned.iter())
            .sorted_by_key(|segment| segment.start)
            .collect_vec();

        let mut spans: Vec<DateRange> = Vec::new();
        for segment in ordered {
            match spans.last_mut() {
                Some(span) if segment.start <= span.finish => {
                    span.finish = span.finish.max(segment.finish);
                }
                _ => spans.push(DateRange {
                    start: segment.start,
                    finish: segment.finish,
                }),
            }
        }

        if spans.len() > 1 {
            task.splits = Some(spans);
        }
    }
}
