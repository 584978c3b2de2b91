use chrono::NaiveDateTime;
use num_derive::FromPrimitive;

/// All container timestamps resolve to naive local wall time.
pub type Date = NaiveDateTime;

#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive)]
pub enum TimeUnit {
    Minutes = 1,
    Hours = 2,
    Days = 3,
}

/// Number of minutes per working day, per working week and related
/// figures used when converting durations between units.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ProjectProperties {
    pub minutes_per_day: f64,
}

impl Default for ProjectProperties {
    fn default() -> ProjectProperties {
        ProjectProperties {
            minutes_per_day: 480.0,
        }
    }
}

/// A duration with an explicit unit. Kept as a value object, conversion
/// between units needs the project's working-time figures.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Duration {
    pub value: f64,
    pub unit: TimeUnit,
}

impl Duration {
    pub fn new(value: f64, unit: TimeUnit) -> Duration {
        Duration { value, unit }
    }

    pub fn minutes(value: f64) -> Duration {
        Duration::new(value, TimeUnit::Minutes)
    }

    pub fn hours(value: f64) -> Duration {
        Duration::new(value, TimeUnit::Hours)
    }

    pub fn days(value: f64) -> Duration {
        Duration::new(value, TimeUnit::Days)
    }

    pub fn is_zero(&self) -> bool {
        self.value == 0.0
    }

    pub fn as_minutes(&self, props: &ProjectProperties) -> f64 {
        match self.unit {
            TimeUnit::Minutes => self.value,
            TimeUnit::Hours => self.value * 60.0,
            TimeUnit::Days => self.value * props.minutes_per_day,
        }
    }

    pub fn convert_units(&self, unit: TimeUnit, props: &ProjectProperties) -> Duration {
        if self.unit == unit {
            return *self;
        }
        let minutes = self.as_minutes(props);
        let value = match unit {
            TimeUnit::Minutes => minutes,
            TimeUnit::Hours => minutes / 60.0,
            TimeUnit::Days => minutes / props.minutes_per_day,
        };
        Duration::new(value, unit)
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, FromPrimitive)]
pub enum ResourceType {
    Material = 0,
    Work = 1,
    Cost = 2,
}

/// Named shape of a work-rate curve over an assignment's duration.
/// Codes not in the legacy table are carried through as `Other`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum WorkContour {
    Flat,
    BackLoaded,
    FrontLoaded,
    DoublePeak,
    EarlyPeak,
    LatePeak,
    Bell,
    Turtle,
    Contoured,
    Other(u16),
}

impl WorkContour {
    pub fn from_code(code: u16) -> WorkContour {
        match code {
            0 => WorkContour::Flat,
            1 => WorkContour::BackLoaded,
            2 => WorkContour::FrontLoaded,
            3 => WorkContour::DoublePeak,
            4 => WorkContour::EarlyPeak,
            5 => WorkContour::LatePeak,
            6 => WorkContour::Bell,
            7 => WorkContour::Turtle,
            8 => WorkContour::Contoured,
            other => WorkContour::Other(other),
        }
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
pub struct DateRange {
    pub start: Date,
    pub finish: Date,
}
