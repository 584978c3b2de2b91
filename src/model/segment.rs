use crate::types::{Date, Duration};

/// A time-bounded span of constant work rate. Segments are mutated while
/// a blob is being decoded and treated as immutable values afterwards.
#[derive(Clone, PartialEq, Debug)]
pub struct WorkSegment {
    pub start: Date,
    pub finish: Date,
    /// Rate over the span, normally minutes per day.
    pub work_per_day: Duration,
    pub total_work: Duration,
    /// True when the encoded rate was shaped by hand rather than uniform.
    pub modified: bool,
}
