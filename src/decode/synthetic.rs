//! Flat-rate fallback for assignments whose file carries no timephased
//! data at all, common in older files and untouched default allocations.

use log::debug;

use crate::calendar::ProjectCalendar;
use crate::model::{Assignment, WorkSegment};
use crate::types::{Duration, ProjectProperties, ResourceType, TimeUnit};

/// Manufacture the single planned segment spanning the assignment. The
/// daily rate depends on the resource type:
/// - work-type (or unknown) resources take the configured default rate,
///   scaled linearly when units differ from 100%;
/// - material/cost resources without a variable rate spread their units
///   over the calendar's working days;
/// - material/cost resources with a variable hourly rate convert that
///   rate through the default working day.
pub fn build(
    assignment: &Assignment,
    resource_type: Option<ResourceType>,
    calendar: &dyn ProjectCalendar,
    props: &ProjectProperties,
    default_work_per_day: Duration,
) -> Option<WorkSegment> {
    let start = assignment.start?;
    let finish = assignment.finish?;

    let work_per_day = match resource_type {
        None | Some(ResourceType::Work) => {
            let mut rate = default_work_per_day;
            // Units compare and scale as a truncated whole percentage.
            let units = assignment.units.unwrap_or(0.0) as i64;
            if units != 100 {
                rate = Duration::new(rate.value * units as f64 / 100.0, rate.unit);
            }
            rate
        }
        Some(_) => {
            let units = assignment.units.unwrap_or(0.0);
            match assignment.variable_rate_units {
                None => {
                    let working_days = calendar
                        .working_duration(start, finish, TimeUnit::Days, props)
                        .value;
                    if working_days == 0.0 {
                        debug!("no working days between assignment start and finish");
                        Duration::minutes(0.0)
                    } else {
                        Duration::minutes(units * 60.0 / (working_days * 100.0))
                    }
                }
                Some(_) => {
                    let hours_per_day = default_work_per_day
                        .convert_units(TimeUnit::Hours, props)
                        .value;
                    Duration::minutes(units * hours_per_day * 60.0 / 100.0)
                }
            }
        }
    };

    let total_work = assignment
        .work
        .map(|w| w.convert_units(TimeUnit::Minutes, props))
        .unwrap_or_else(|| Duration::minutes(0.0));

    Some(WorkSegment {
        start,
        finish,
        work_per_day,
        total_work,
        modified: false,
    })
}
