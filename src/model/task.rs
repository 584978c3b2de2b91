use crate::types::DateRange;

#[derive(Clone, PartialEq, Debug)]
pub struct Task {
    pub unique_id: i32,
    pub name: String,
    pub calendar_id: Option<i32>,
    /// When set, the resource calendar is bypassed in favour of this
    /// task's own calendar during assignment decoding.
    pub ignore_resource_calendar: bool,
    /// None = splits never considered; Some(empty) = candidate for split
    /// detection; Some(non-empty) = already detected.
    pub splits: Option<Vec<DateRange>>,
    /// Indices into the project's assignment arena.
    pub assignments: Vec<usize>,
}

impl Task {
    pub fn new(unique_id: i32, name: &str) -> Task {
        Task {
            unique_id,
            name: name.to_string(),
            calendar_id: None,
            ignore_resource_calendar: false,
            splits: Some(Vec::new()),
            assignments: Vec::new(),
        }
    }
}
