use chrono::{Datelike, NaiveDate, NaiveTime};
use log::warn;

use crate::types::{Date, Duration, ProjectProperties, TimeUnit};

/// Working-time arithmetic consumed by the assignment decoder. The actual
/// calendar model (exceptions, per-resource weeks) lives with the caller;
/// this trait is the seam the decoder talks through.
pub trait ProjectCalendar {
    /// Working time between two points, expressed in `unit`.
    fn working_duration(
        &self,
        start: Date,
        finish: Date,
        unit: TimeUnit,
        props: &ProjectProperties,
    ) -> Duration;

    /// The point reached after consuming `offset` of working time from
    /// `start`. With `next_work_start` set, a result landing on the end of
    /// a working period rolls forward to the start of the next one.
    fn date_from_work(
        &self,
        start: Date,
        offset: Duration,
        next_work_start: bool,
        props: &ProjectProperties,
    ) -> Date;

    /// Earliest working instant at or after `date`.
    fn next_work_start(&self, date: Date) -> Date;
}

// Bounded walk so a calendar with no working time cannot spin forever.
const MAX_WALK_DAYS: u32 = 3700;

/// Monday to Friday, 08:00-12:00 and 13:00-17:00. Stands in when the
/// container supplies no calendar of its own.
pub struct StandardCalendar {
    working_days: [bool; 7],
    ranges: Vec<(NaiveTime, NaiveTime)>,
}

impl StandardCalendar {
    pub fn new() -> StandardCalendar {
        let morning = (
            NaiveTime::from_hms_opt(8, 0, 0).unwrap_or(NaiveTime::MIN),
            NaiveTime::from_hms_opt(12, 0, 0).unwrap_or(NaiveTime::MIN),
        );
        let afternoon = (
            NaiveTime::from_hms_opt(13, 0, 0).unwrap_or(NaiveTime::MIN),
            NaiveTime::from_hms_opt(17, 0, 0).unwrap_or(NaiveTime::MIN),
        );
        StandardCalendar {
            working_days: [true, true, true, true, true, false, false],
            ranges: vec![morning, afternoon],
        }
    }

    pub fn with_ranges(working_days: [bool; 7], ranges: Vec<(NaiveTime, NaiveTime)>) -> StandardCalendar {
        StandardCalendar {
            working_days,
            ranges,
        }
    }

    fn is_working_day(&self, day: NaiveDate) -> bool {
        self.working_days[day.weekday().num_days_from_monday() as usize]
    }

    fn next_day(day: NaiveDate) -> NaiveDate {
        day.succ_opt().unwrap_or(day)
    }
}

impl Default for StandardCalendar {
    fn default() -> StandardCalendar {
        StandardCalendar::new()
    }
}

impl ProjectCalendar for StandardCalendar {
    fn working_duration(
        &self,
        start: Date,
        finish: Date,
        unit: TimeUnit,
        props: &ProjectProperties,
    ) -> Duration {
        if finish <= start {
            return Duration::new(0.0, unit);
        }

        let mut total_minutes = 0.0;
        let mut day = start.date();
        let mut walked = 0;
        while day <= finish.date() && walked < MAX_WALK_DAYS {
            if self.is_working_day(day) {
                for (range_start, range_finish) in &self.ranges {
                    let lo = day.and_time(*range_start).max(start);
                    let hi = day.and_time(*range_finish).min(finish);
                    if hi > lo {
                        total_minutes += (hi - lo).num_seconds() as f64 / 60.0;
                    }
                }
            }
            day = StandardCalendar::next_day(day);
            walked += 1;
        }

        Duration::minutes(total_minutes).convert_units(unit, props)
    }

    fn date_from_work(
        &self,
        start: Date,
        offset: Duration,
        next_work_start: bool,
        props: &ProjectProperties,
    ) -> Date {
        let mut remaining = offset.as_minutes(props);
        if remaining <= 0.0 {
            return if next_work_start {
                self.next_work_start(start)
            } else {
                start
            };
        }

        let mut cursor = start;
        let mut walked = 0;
        while walked < MAX_WALK_DAYS {
            let day = cursor.date();
            if self.is_working_day(day) {
                for (range_start, range_finish) in &self.ranges {
                    let seg_start = day.and_time(*range_start).max(cursor);
                    let seg_end = day.and_time(*range_finish);
                    if seg_end <= seg_start {
                        continue;
                    }
                    let capacity = (seg_end - seg_start).num_seconds() as f64 / 60.0;
                    if remaining <= capacity + 1e-9 {
                        let result = seg_start
                            + chrono::Duration::seconds((remaining * 60.0).round() as i64);
                        let result = result.min(seg_end);
                        return if next_work_start && result >= seg_end {
                            self.next_work_start(seg_end)
                        } else {
                            result
                        };
                    }
                    remaining -= capacity;
                }
            }
            cursor = StandardCalendar::next_day(day).and_time(NaiveTime::MIN);
            walked += 1;
        }

        warn!("calendar has no working time; clamping date_from_work result");
        start
    }

    fn next_work_start(&self, date: Date) -> Date {
        let mut cursor = date;
        let mut walked = 0;
        while walked < MAX_WALK_DAYS {
            let day = cursor.date();
            if self.is_working_day(day) {
                for (range_start, range_finish) in &self.ranges {
                    let seg_start = day.and_time(*range_start);
                    let seg_end = day.and_time(*range_finish);
                    if cursor <= seg_start {
                        return seg_start;
                    }
                    if cursor < seg_end {
                        return cursor;
                    }
                }
            }
            cursor = StandardCalendar::next_day(day).and_time(NaiveTime::MIN);
            walked += 1;
        }

        warn!("calendar has no working time; next_work_start falls back to input");
        date
    }
}
