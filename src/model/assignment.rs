use crate::fields::{AssignmentField, FieldValue};
use crate::model::segment::WorkSegment;
use crate::types::{Date, Duration, TimeUnit, WorkContour};

/// A resource's allocation to a task. Built fresh per fixed record,
/// mutated in place during the decode pass and handed off unchanged.
#[derive(Clone, PartialEq, Debug)]
pub struct Assignment {
    pub unique_id: i32,
    pub task_unique_id: Option<i32>,
    pub resource_unique_id: Option<i32>,
    pub start: Option<Date>,
    pub finish: Option<Date>,
    /// Assignment units on a 0-100 scale.
    pub units: Option<f64>,
    pub work: Option<Duration>,
    pub actual_work: Option<Duration>,
    pub remaining_work: Option<Duration>,
    pub flags: [bool; 20],
    pub confirmed: bool,
    pub response_pending: bool,
    pub team_status_pending: bool,
    pub hyperlink: Option<String>,
    pub hyperlink_address: Option<String>,
    pub hyperlink_sub_address: Option<String>,
    pub hyperlink_screen_tip: Option<String>,
    pub notes: Option<String>,
    pub create_date: Option<Date>,
    pub actual_start: Option<Date>,
    pub actual_finish: Option<Date>,
    pub work_contour: Option<WorkContour>,
    pub variable_rate_units: Option<TimeUnit>,
    pub timephased_planned: Vec<WorkSegment>,
    pub timephased_complete: Vec<WorkSegment>,
    events_enabled: bool,
}

impl Assignment {
    pub fn new(unique_id: i32) -> Assignment {
        Assignment {
            unique_id,
            task_unique_id: None,
            resource_unique_id: None,
            start: None,
            finish: None,
            units: None,
            work: None,
            actual_work: None,
            remaining_work: None,
            flags: [false; 20],
            confirmed: false,
            response_pending: false,
            team_status_pending: false,
            hyperlink: None,
            hyperlink_address: None,
            hyperlink_sub_address: None,
            hyperlink_screen_tip: None,
            notes: None,
            create_date: None,
            actual_start: None,
            actual_finish: None,
            work_contour: None,
            variable_rate_units: None,
            timephased_planned: Vec::new(),
            timephased_complete: Vec::new(),
            events_enabled: true,
        }
    }

    /// Batch-mutation mode: no observer should see a partially populated
    /// entity, so bulk loads run with events off.
    pub fn disable_events(&mut self) {
        self.events_enabled = false;
    }

    pub fn enable_events(&mut self) {
        self.events_enabled = true;
    }

    pub fn events_enabled(&self) -> bool {
        self.events_enabled
    }

    pub fn set_flag(&mut self, number: u8, value: bool) {
        if (1..=20).contains(&number) {
            self.flags[(number - 1) as usize] = value;
        }
    }

    pub fn flag(&self, number: u8) -> bool {
        if (1..=20).contains(&number) {
            self.flags[(number - 1) as usize]
        } else {
            false
        }
    }

    /// Write-through used by bulk field population. Type mismatches are a
    /// layout bug against this entity and are silently ignored, matching
    /// the skip-rather-than-fail policy of the decoder.
    pub fn set_field_value(&mut self, field: AssignmentField, value: FieldValue) {
        match (field, value) {
            (AssignmentField::UniqueId, FieldValue::Int(v)) => self.unique_id = v,
            (AssignmentField::TaskUniqueId, FieldValue::Int(v)) => self.task_unique_id = Some(v),
            (AssignmentField::ResourceUniqueId, FieldValue::Int(v)) => {
                self.resource_unique_id = Some(v)
            }
            (AssignmentField::Start, FieldValue::Date(v)) => self.start = Some(v),
            (AssignmentField::Finish, FieldValue::Date(v)) => self.finish = Some(v),
            (AssignmentField::Units, FieldValue::Double(v)) => self.units = Some(v),
            (AssignmentField::Work, FieldValue::Duration(v)) => self.work = Some(v),
            (AssignmentField::ActualWork, FieldValue::Duration(v)) => self.actual_work = Some(v),
            (AssignmentField::RemainingWork, FieldValue::Duration(v)) => {
                self.remaining_work = Some(v)
            }
            (AssignmentField::Flag(n), FieldValue::Bool(v)) => self.set_flag(n, v),
            (AssignmentField::Confirmed, FieldValue::Bool(v)) => self.confirmed = v,
            (AssignmentField::ResponsePending, FieldValue::Bool(v)) => self.response_pending = v,
            (AssignmentField::TeamStatusPending, FieldValue::Bool(v)) => {
                self.team_status_pending = v
            }
            (AssignmentField::Notes, FieldValue::Text(v)) => self.notes = Some(v),
            (AssignmentField::CreateDate, FieldValue::Date(v)) => self.create_date = Some(v),
            (AssignmentField::VariableRateUnits, FieldValue::RateUnits(v)) => {
                self.variable_rate_units = Some(v)
            }
            _ => {}
        }
    }
}
